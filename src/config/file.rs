//! The `wrapper.yml` settings file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{parse_ttl, write_atomic, WORLD_READABLE};
use crate::environment::LoaderKind;
use crate::error::{Result, ShimError};

/// A duration written either as bare seconds (`300`) or with a unit (`5m`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub fn to_duration(&self) -> anyhow::Result<Duration> {
        match self {
            Self::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            Self::Text(text) => parse_ttl(text),
        }
    }
}

impl From<Duration> for DurationValue {
    fn from(duration: Duration) -> Self {
        Self::Seconds(duration.as_secs())
    }
}

/// Contents of `wrapper.yml`. Every key is optional.
///
/// # Example
///
/// ```yaml
/// remote_url: https://config.example.com/claude-env.sh
/// ttl: 5m
/// loader: shell
/// local_keys: [LITELLM_BASE_URL, OP_ITEM]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrapperFile {
    /// URL of the remote environment script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    /// Cache time-to-live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<DurationValue>,

    /// Connection timeout for the fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<DurationValue>,

    /// Total timeout for the fetch, redirects included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<DurationValue>,

    /// Maximum redirects followed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_redirects: Option<usize>,

    /// How environment scripts are interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<LoaderKind>,

    /// Interpreter for the shell loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<PathBuf>,

    /// Keys recognised in `local.env`: endpoint first, secret reference second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_keys: Option<Vec<String>>,

    /// Prefix a secret reference must start with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref_prefix: Option<String>,
}

impl WrapperFile {
    /// Parse YAML content; `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ShimError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `path`, treating a missing file as empty.
    pub fn load_optional(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ShimError::Io(e)),
        }
    }

    /// Atomically write the file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(anyhow::Error::from)?;
        write_atomic(path, yaml.as_bytes(), WORLD_READABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_all_keys() {
        let yaml = r#"
remote_url: https://config.example.com/env.sh
ttl: 5m
connect_timeout: 2
timeout: 15s
max_redirects: 3
loader: assignments
shell: /bin/bash
local_keys: [BASE_URL, SECRET]
secret_ref_prefix: "vault://"
"#;
        let file = WrapperFile::parse(yaml, Path::new("wrapper.yml")).unwrap();

        assert_eq!(
            file.remote_url.as_deref(),
            Some("https://config.example.com/env.sh")
        );
        assert_eq!(
            file.ttl.unwrap().to_duration().unwrap(),
            Duration::from_secs(300)
        );
        assert_eq!(
            file.connect_timeout.unwrap().to_duration().unwrap(),
            Duration::from_secs(2)
        );
        assert_eq!(file.max_redirects, Some(3));
        assert_eq!(file.loader, Some(LoaderKind::Assignments));
        assert_eq!(file.shell, Some(PathBuf::from("/bin/bash")));
        assert_eq!(
            file.local_keys,
            Some(vec!["BASE_URL".to_string(), "SECRET".to_string()])
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = WrapperFile::parse("remote_uri: x\n", Path::new("/cfg/wrapper.yml")).unwrap_err();
        match err {
            ShimError::ConfigParseError { path, message } => {
                assert_eq!(path, PathBuf::from("/cfg/wrapper.yml"));
                assert!(message.contains("remote_uri"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_is_default() {
        let file = WrapperFile::parse("\n", Path::new("wrapper.yml")).unwrap();
        assert_eq!(file, WrapperFile::default());
    }

    #[test]
    fn missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let file = WrapperFile::load_optional(&temp.path().join("wrapper.yml")).unwrap();
        assert_eq!(file, WrapperFile::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tool").join("wrapper.yml");

        let file = WrapperFile {
            remote_url: Some("https://config.example.com/env.sh".into()),
            ttl: Some(DurationValue::Text("10m".into())),
            ..Default::default()
        };
        file.save(&path).unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert!(!saved.contains("loader"));
        assert_eq!(WrapperFile::load_optional(&path).unwrap(), file);
    }

    #[test]
    fn bad_duration_text_fails_on_conversion() {
        let file = WrapperFile::parse("ttl: soon\n", Path::new("wrapper.yml")).unwrap();
        assert!(file.ttl.unwrap().to_duration().is_err());
    }
}
