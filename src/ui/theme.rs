//! Colors and glyphs for the management commands.

use console::Style;

/// Styles for management-mode output, all targeting stderr.
#[derive(Debug, Clone)]
pub struct ShimTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    /// Paths and other secondary detail.
    pub dim: Style,
    pub header: Style,
    /// Labels in `status` fields.
    pub key: Style,
}

impl Default for ShimTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ShimTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().for_stderr().green(),
            warning: Style::new().for_stderr().color256(208),
            error: Style::new().for_stderr().red().bold(),
            dim: Style::new().for_stderr().dim(),
            header: Style::new().for_stderr().bold().cyan(),
            key: Style::new().for_stderr().bold(),
        }
    }

    /// No styling at all; used when stderr is not a terminal or `NO_COLOR` is set.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            key: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Format a `key: value` line with the key padded for alignment.
    pub fn format_field(&self, key: &str, value: &str) -> String {
        format!(
            "  {} {}",
            self.key.apply_to(format!("{:<10}", format!("{key}:"))),
            value
        )
    }
}

/// Check if colors should be enabled on stderr.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stderr().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_prefixes_glyphs() {
        let theme = ShimTheme::plain();
        assert_eq!(theme.format_success("Cache refreshed"), "✓ Cache refreshed");
        assert_eq!(theme.format_warning("op CLI not found"), "⚠ op CLI not found");
        assert_eq!(theme.format_error("no remote URL"), "✗ no remote URL");
    }

    #[test]
    fn field_keys_are_padded() {
        let msg = ShimTheme::plain().format_field("TTL", "5m");
        assert_eq!(msg, "  TTL:       5m");
    }
}
