//! User-facing output for the management commands.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] writing to stderr, so stdout stays free for
//!   machine-readable output
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use envshim::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Installing claude wrapper");
//! ui.success("Wrapper installed");
//! assert_eq!(ui.successes(), &["Wrapper installed"]);
//! ```

pub mod mock;
pub mod prompts;
pub mod terminal;
pub mod theme;

pub use mock::{MockUI, Shown};
pub use prompts::prompt_user;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, ShimTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Display a `key: value` line.
    fn field(&mut self, key: &str, value: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Ask for a line of text.
    fn prompt(&mut self, prompt: &Prompt) -> Result<String>;

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// A text prompt to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Unique key for the prompt (used for lookup in tests).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

impl Prompt {
    pub fn new(key: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            question: question.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: Option<impl Into<String>>) -> Self {
        self.default = default.map(Into::into);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_builder_sets_default() {
        let prompt = Prompt::new("endpoint", "Base URL").with_default(Some("https://x"));
        assert_eq!(prompt.key, "endpoint");
        assert_eq!(prompt.default.as_deref(), Some("https://x"));

        let prompt = Prompt::new("endpoint", "Base URL").with_default(None::<String>);
        assert!(prompt.default.is_none());
    }
}
