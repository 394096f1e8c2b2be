//! The user's `local.env` override file.
//!
//! Written once by the installer and read on every invocation. Only the
//! configured keys are recognised, each on its own `KEY="value"` line.

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::cache::{write_atomic, OWNER_ONLY};
use crate::environment::EnvLayer;
use crate::error::{Result, ShimError};

/// User-specific overrides layered above the remote configuration.
///
/// The first configured key is the endpoint, the second the secret
/// reference.
///
/// # Example
///
/// ```
/// use envshim::config::LocalOverrideConfig;
///
/// let keys = vec!["LITELLM_BASE_URL".to_string(), "OP_ITEM".to_string()];
/// let content = "# overrides\nLITELLM_BASE_URL=\"https://llm.example.com\"\nOTHER=\"x\"\n";
/// let local = LocalOverrideConfig::parse(content, &keys).unwrap();
///
/// assert_eq!(local.endpoint(), Some("https://llm.example.com"));
/// assert_eq!(local.secret_ref(), None);
/// assert_eq!(local.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOverrideConfig {
    keys: Vec<String>,
    values: HashMap<String, String>,
}

impl LocalOverrideConfig {
    /// An empty override set for `keys`.
    pub fn new(keys: &[String]) -> Self {
        Self {
            keys: keys.to_vec(),
            values: HashMap::new(),
        }
    }

    /// Parse file content, keeping only lines for `keys`.
    pub fn parse(content: &str, keys: &[String]) -> Result<Self> {
        let mut config = Self::new(keys);
        if keys.is_empty() {
            return Ok(config);
        }

        let alternatives: Vec<String> = keys.iter().map(|k| regex::escape(k)).collect();
        let pattern = Regex::new(&format!(r#"^({})="(.*)"\s*$"#, alternatives.join("|")))
            .map_err(anyhow::Error::from)?;

        for line in content.lines() {
            if let Some(caps) = pattern.captures(line) {
                config.values.insert(caps[1].to_string(), caps[2].to_string());
            }
        }
        Ok(config)
    }

    /// Load `path`; a missing file yields an empty set.
    pub fn load(path: &Path, keys: &[String]) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, keys),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new(keys)),
            Err(e) => Err(ShimError::EnvLoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a recognised key. Unknown keys are ignored and reported as `false`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        if !self.keys.iter().any(|k| k == key) {
            return false;
        }
        self.values.insert(key.to_string(), value.into());
        true
    }

    pub fn endpoint_key(&self) -> Option<&str> {
        self.keys.first().map(String::as_str)
    }

    pub fn secret_ref_key(&self) -> Option<&str> {
        self.keys.get(1).map(String::as_str)
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint_key().and_then(|k| self.get(k))
    }

    pub fn secret_ref(&self) -> Option<&str> {
        self.secret_ref_key().and_then(|k| self.get(k))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// File content with a header, one line per key in key order.
    pub fn render(&self, command: &str) -> String {
        let mut out = format!(
            "# {command} local.env: user-specific overrides\n# Written by envshim install, read on every {command} launch\n"
        );
        for key in &self.keys {
            if let Some(value) = self.values.get(key) {
                out.push_str(&format!("{key}=\"{value}\"\n"));
            }
        }
        out
    }

    /// Atomically write the file, owner-only.
    pub fn write(&self, path: &Path, command: &str) -> Result<()> {
        write_atomic(path, self.render(command).as_bytes(), OWNER_ONLY)
    }

    /// The overrides as the `local` environment layer.
    pub fn to_layer(&self) -> EnvLayer {
        EnvLayer::from_vars("local", self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn keys() -> Vec<String> {
        vec!["LITELLM_BASE_URL".to_string(), "OP_ITEM".to_string()]
    }

    #[test]
    fn reads_only_recognised_keys() {
        let content = r#"# header
LITELLM_BASE_URL="https://llm.example.com"
OP_ITEM="op://Employee/llm key"
EXTRA="ignored"
export OP_ITEM="op://not/matched"
"#;
        let local = LocalOverrideConfig::parse(content, &keys()).unwrap();

        assert_eq!(local.endpoint(), Some("https://llm.example.com"));
        assert_eq!(local.secret_ref(), Some("op://Employee/llm key"));
        assert_eq!(local.len(), 2);
    }

    #[test]
    fn unquoted_values_do_not_match() {
        let local = LocalOverrideConfig::parse("OP_ITEM=op://a\n", &keys()).unwrap();
        assert!(local.is_empty());
    }

    #[test]
    fn trailing_whitespace_is_allowed() {
        let local = LocalOverrideConfig::parse("OP_ITEM=\"op://a\"   \n", &keys()).unwrap();
        assert_eq!(local.secret_ref(), Some("op://a"));
    }

    #[test]
    fn key_names_are_matched_literally() {
        let keys = vec!["A.B".to_string()];
        let local = LocalOverrideConfig::parse("AXB=\"1\"\nA.B=\"2\"\n", &keys).unwrap();
        assert_eq!(local.get("A.B"), Some("2"));
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let local = LocalOverrideConfig::load(&temp.path().join("local.env"), &keys()).unwrap();
        assert!(local.is_empty());
        assert_eq!(local.keys(), keys().as_slice());
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let mut local = LocalOverrideConfig::new(&keys());
        assert!(local.set("OP_ITEM", "op://a"));
        assert!(!local.set("OTHER", "x"));
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn write_then_load_keeps_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("claude").join("local.env");

        let mut local = LocalOverrideConfig::new(&keys());
        local.set("LITELLM_BASE_URL", "https://llm.example.com");
        local.set("OP_ITEM", "op://Employee/key");
        local.write(&path, "claude").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# claude local.env"));
        assert_eq!(LocalOverrideConfig::load(&path, &keys()).unwrap(), local);
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("local.env");
        LocalOverrideConfig::new(&keys()).write(&path, "claude").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn to_layer_is_named_local() {
        let mut local = LocalOverrideConfig::new(&keys());
        local.set("OP_ITEM", "op://a");
        let layer = local.to_layer();
        assert_eq!(layer.source, "local");
        assert!(layer.contains("OP_ITEM"));
    }
}
