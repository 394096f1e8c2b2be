//! Recording [`UserInterface`] for tests.
//!
//! Every call lands in one ordered log, so tests can check either a single
//! kind of output or the sequence as a whole. Prompt answers are scripted
//! per key.
//!
//! ```
//! use envshim::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("endpoint", "https://llm.example.com");
//!
//! let answer = ui.prompt(&Prompt::new("endpoint", "Base URL")).unwrap();
//! assert_eq!(answer, "https://llm.example.com");
//! assert_eq!(ui.prompts_shown(), &["endpoint"]);
//! ```

use std::collections::{HashMap, VecDeque};

use crate::error::Result;

use super::{Prompt, UserInterface};

/// One thing the code under test showed the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Message(String),
    Success(String),
    Warning(String),
    Error(String),
    Field(String, String),
    Header(String),
}

/// Answers for one prompt key: queued ones first, then a fixed fallback.
#[derive(Debug, Default)]
struct Answers {
    queued: VecDeque<String>,
    fallback: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockUI {
    interactive: bool,
    log: Vec<Shown>,
    answers: HashMap<String, Answers>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    pub fn new() -> Self {
        Self {
            interactive: true,
            ..Default::default()
        }
    }

    pub fn non_interactive() -> Self {
        Self::default()
    }

    /// Answer every prompt for `key` with `response` once the queue is empty.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.answers.entry(key.to_string()).or_default().fallback = Some(response.to_string());
    }

    /// Answer the next prompts for `key` with `responses`, in order.
    pub fn queue_prompt_responses(&mut self, key: &str, responses: Vec<&str>) {
        let answers = self.answers.entry(key.to_string()).or_default();
        answers
            .queued
            .extend(responses.into_iter().map(str::to_string));
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Everything shown, in order.
    pub fn log(&self) -> &[Shown] {
        &self.log
    }

    pub fn messages(&self) -> Vec<&str> {
        self.texts(|s| match s {
            Shown::Message(m) => Some(m),
            _ => None,
        })
    }

    pub fn successes(&self) -> Vec<&str> {
        self.texts(|s| match s {
            Shown::Success(m) => Some(m),
            _ => None,
        })
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.texts(|s| match s {
            Shown::Warning(m) => Some(m),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.texts(|s| match s {
            Shown::Error(m) => Some(m),
            _ => None,
        })
    }

    pub fn headers(&self) -> Vec<&str> {
        self.texts(|s| match s {
            Shown::Header(m) => Some(m),
            _ => None,
        })
    }

    /// Value of the first field shown with `key`.
    pub fn field_value(&self, key: &str) -> Option<&str> {
        self.log.iter().find_map(|s| match s {
            Shown::Field(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }

    /// Keys of every prompt shown, in order.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    fn texts<'a>(&'a self, pick: impl Fn(&'a Shown) -> Option<&'a String>) -> Vec<&'a str> {
        self.log.iter().filter_map(pick).map(String::as_str).collect()
    }
}

impl UserInterface for MockUI {
    fn message(&mut self, msg: &str) {
        self.log.push(Shown::Message(msg.to_string()));
    }

    fn success(&mut self, msg: &str) {
        self.log.push(Shown::Success(msg.to_string()));
    }

    fn warning(&mut self, msg: &str) {
        self.log.push(Shown::Warning(msg.to_string()));
    }

    fn error(&mut self, msg: &str) {
        self.log.push(Shown::Error(msg.to_string()));
    }

    fn field(&mut self, key: &str, value: &str) {
        self.log
            .push(Shown::Field(key.to_string(), value.to_string()));
    }

    fn show_header(&mut self, title: &str) {
        self.log.push(Shown::Header(title.to_string()));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        self.prompts_shown.push(prompt.key.clone());

        let scripted = self.answers.get_mut(&prompt.key).and_then(|answers| {
            answers
                .queued
                .pop_front()
                .or_else(|| answers.fallback.clone())
        });
        Ok(scripted
            .or_else(|| prompt.default.clone())
            .unwrap_or_default())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
