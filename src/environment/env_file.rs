//! Assignment-file parsing.
//!
//! Reads environment scripts without executing them, picking out the
//! `KEY=value` and `export KEY=value` lines.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parses assignment files into a map of environment variables.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Exported: `export KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Empty: `KEY=`
/// - Comments: `# This is a comment`
/// - Values with equals signs: `URL=https://example.com?foo=bar`
///
/// Lines that are not assignments (shell commands, `fi`, blank lines) are
/// skipped. No expansion of `$VAR` or `$(...)` is performed.
///
/// # Example
///
/// ```
/// use envshim::environment::EnvFileParser;
///
/// let content = r#"
/// # Team config
/// export ANTHROPIC_BASE_URL="https://llm.example.com"
/// DEBUG=true
/// "#;
///
/// let vars = EnvFileParser::parse(content);
/// assert_eq!(vars.get("ANTHROPIC_BASE_URL").map(String::as_str), Some("https://llm.example.com"));
/// assert_eq!(vars.get("DEBUG").map(String::as_str), Some("true"));
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse file content into a map of variables. Later lines win.
    pub fn parse(content: &str) -> HashMap<String, String> {
        let mut vars = HashMap::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = Self::parse_line(line) {
                vars.insert(key, value);
            }
        }

        vars
    }

    /// Parse a single line.
    fn parse_line(line: &str) -> Option<(String, String)> {
        let line = line
            .strip_prefix("export ")
            .map(str::trim_start)
            .unwrap_or(line);

        let eq_pos = line.find('=')?;
        let key = &line[..eq_pos];
        if !is_valid_name(key) {
            return None;
        }
        let value = Self::unquote(line[eq_pos + 1..].trim());

        Some((key.to_string(), value))
    }

    /// Remove surrounding quotes from a value.
    fn unquote(value: &str) -> String {
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));
        if quoted {
            value[1..value.len() - 1].to_string()
        } else {
            value.to_string()
        }
    }

    /// Load and parse a file from a path.
    pub fn load(path: &Path) -> Result<HashMap<String, String>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Load and parse a file, returning an empty map if it doesn't exist.
    pub fn load_optional(path: &Path) -> Result<HashMap<String, String>> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(HashMap::new())
        }
    }
}

/// Whether `name` is a POSIX shell variable name.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
