//! Resolved per-invocation settings.
//!
//! Precedence, later wins:
//!
//! 1. Built-in defaults
//! 2. `wrapper.yml` in the command's config directory
//! 3. `<PREFIX>_ENV_URL`, `<PREFIX>_ENV_UPDATE_TTL` and `<PREFIX>_DEBUG`

use std::path::Path;
use std::time::Duration;

use super::{AppDirs, DurationValue, RuntimeEnv, WrapperFile};
use crate::cache::{parse_ttl, DEFAULT_TTL};
use crate::environment::{ScriptLoader, DEFAULT_SHELL};
use crate::error::{Result, ShimError};
use crate::fetch::FetchOptions;

/// Local override keys when `wrapper.yml` names none.
pub const DEFAULT_LOCAL_KEYS: &[&str] = &["LITELLM_BASE_URL", "OP_ITEM"];
/// Required prefix of a secret reference.
pub const DEFAULT_SECRET_REF_PREFIX: &str = "op://";

/// Environment variable prefix for a command: `claude` -> `CLAUDE`,
/// `my-tool` -> `MY_TOOL`.
pub fn env_prefix(command: &str) -> String {
    command
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether `<PREFIX>_DEBUG` asks for debug output.
pub fn debug_requested(command: &str, env: &RuntimeEnv) -> bool {
    env.var(format!("{}_DEBUG", env_prefix(command)))
        .is_some_and(|v| v != "0")
}

/// Everything one invocation needs to know, resolved once.
#[derive(Debug, Clone)]
pub struct Settings {
    pub command: String,
    pub dirs: AppDirs,
    pub remote_url: Option<String>,
    pub ttl: Duration,
    pub fetch: FetchOptions,
    pub loader: ScriptLoader,
    pub local_keys: Vec<String>,
    pub secret_ref_prefix: String,
    pub debug: bool,
}

impl Settings {
    /// Resolve settings for `command` from its `wrapper.yml` and `env`.
    pub fn load(command: &str, env: &RuntimeEnv) -> Result<Self> {
        let dirs = AppDirs::for_command(command, env)?;
        let file = WrapperFile::load_optional(&dirs.wrapper_file())?;
        Self::from_parts(command, dirs, &file, env)
    }

    /// Resolve settings from an already loaded file.
    pub fn from_parts(
        command: &str,
        dirs: AppDirs,
        file: &WrapperFile,
        env: &RuntimeEnv,
    ) -> Result<Self> {
        let wrapper_file = dirs.wrapper_file();
        let duration = |value: &Option<DurationValue>, default: Duration| -> Result<Duration> {
            value
                .as_ref()
                .map(|v| file_duration(v, &wrapper_file))
                .transpose()
                .map(|d| d.unwrap_or(default))
        };

        let defaults = FetchOptions::default();
        let fetch = FetchOptions {
            connect_timeout: duration(&file.connect_timeout, defaults.connect_timeout)?,
            timeout: duration(&file.timeout, defaults.timeout)?,
            max_redirects: file.max_redirects.unwrap_or(defaults.max_redirects),
        };

        let prefix = env_prefix(command);

        let mut ttl = duration(&file.ttl, DEFAULT_TTL)?;
        let ttl_var = format!("{prefix}_ENV_UPDATE_TTL");
        if let Some(raw) = env.var(&ttl_var) {
            match parse_ttl(raw) {
                Ok(parsed) => ttl = parsed,
                Err(e) => tracing::warn!("Ignoring {}: {:#}", ttl_var, e),
            }
        }

        let remote_url = env
            .var(format!("{prefix}_ENV_URL"))
            .map(str::to_string)
            .or_else(|| file.remote_url.clone().filter(|u| !u.trim().is_empty()));

        let loader = ScriptLoader::new(
            file.loader.unwrap_or_default(),
            file.shell.clone().unwrap_or_else(|| DEFAULT_SHELL.into()),
        );

        let local_keys = match &file.local_keys {
            Some(keys) => {
                if let Some(bad) = keys
                    .iter()
                    .find(|k| !crate::environment::is_valid_name(k))
                {
                    return Err(ShimError::ConfigParseError {
                        path: wrapper_file,
                        message: format!("'{bad}' is not a valid variable name"),
                    });
                }
                keys.clone()
            }
            None => DEFAULT_LOCAL_KEYS.iter().map(|k| k.to_string()).collect(),
        };

        Ok(Self {
            command: command.to_string(),
            dirs,
            remote_url,
            ttl,
            fetch,
            loader,
            local_keys,
            secret_ref_prefix: file
                .secret_ref_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_SECRET_REF_PREFIX.to_string()),
            debug: debug_requested(command, env),
        })
    }

    /// The remote URL, or a configuration error naming where to set one.
    pub fn require_remote_url(&self) -> Result<&str> {
        self.remote_url
            .as_deref()
            .ok_or_else(|| ShimError::ConfigInvalid {
                message: format!(
                    "no remote URL for `{}`; set {}_ENV_URL or remote_url in {}",
                    self.command,
                    env_prefix(&self.command),
                    self.dirs.wrapper_file().display()
                ),
            })
    }
}

fn file_duration(value: &DurationValue, path: &Path) -> Result<Duration> {
    value
        .to_duration()
        .map_err(|e| ShimError::ConfigParseError {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::LoaderKind;

    fn dirs() -> AppDirs {
        AppDirs::new("/cfg/claude", "/cache/claude")
    }

    #[test]
    fn prefix_maps_non_alphanumerics() {
        assert_eq!(env_prefix("claude"), "CLAUDE");
        assert_eq!(env_prefix("my-tool.v2"), "MY_TOOL_V2");
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let settings =
            Settings::from_parts("claude", dirs(), &WrapperFile::default(), &RuntimeEnv::default())
                .unwrap();

        assert_eq!(settings.ttl, DEFAULT_TTL);
        assert_eq!(settings.fetch, FetchOptions::default());
        assert_eq!(settings.loader.kind(), LoaderKind::Shell);
        assert_eq!(settings.local_keys, vec!["LITELLM_BASE_URL", "OP_ITEM"]);
        assert_eq!(settings.secret_ref_prefix, "op://");
        assert!(settings.remote_url.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn env_overrides_file() {
        let file = WrapperFile {
            remote_url: Some("https://file.example.com/env.sh".into()),
            ttl: Some(DurationValue::Seconds(60)),
            ..Default::default()
        };
        let env = RuntimeEnv::from_vars([
            ("CLAUDE_ENV_URL", "https://env.example.com/env.sh"),
            ("CLAUDE_ENV_UPDATE_TTL", "10"),
            ("CLAUDE_DEBUG", "1"),
        ]);

        let settings = Settings::from_parts("claude", dirs(), &file, &env).unwrap();

        assert_eq!(
            settings.require_remote_url().unwrap(),
            "https://env.example.com/env.sh"
        );
        assert_eq!(settings.ttl, Duration::from_secs(10));
        assert!(settings.debug);
    }

    #[test]
    fn file_values_apply_when_env_unset() {
        let file = WrapperFile {
            remote_url: Some("https://file.example.com/env.sh".into()),
            ttl: Some(DurationValue::Text("1h".into())),
            timeout: Some(DurationValue::Seconds(30)),
            max_redirects: Some(2),
            loader: Some(LoaderKind::Assignments),
            ..Default::default()
        };
        let settings = Settings::from_parts("claude", dirs(), &file, &RuntimeEnv::default()).unwrap();

        assert_eq!(settings.ttl, Duration::from_secs(3600));
        assert_eq!(settings.fetch.timeout, Duration::from_secs(30));
        assert_eq!(settings.fetch.max_redirects, 2);
        assert_eq!(settings.loader.kind(), LoaderKind::Assignments);
        assert_eq!(
            settings.remote_url.as_deref(),
            Some("https://file.example.com/env.sh")
        );
    }

    #[test]
    fn invalid_ttl_env_is_ignored() {
        let env = RuntimeEnv::from_vars([("CLAUDE_ENV_UPDATE_TTL", "soon")]);
        let settings =
            Settings::from_parts("claude", dirs(), &WrapperFile::default(), &env).unwrap();
        assert_eq!(settings.ttl, DEFAULT_TTL);
    }

    #[test]
    fn overflowing_ttl_env_is_ignored() {
        let env = RuntimeEnv::from_vars([("CLAUDE_ENV_UPDATE_TTL", "999999999999999999d")]);
        let settings =
            Settings::from_parts("claude", dirs(), &WrapperFile::default(), &env).unwrap();
        assert_eq!(settings.ttl, DEFAULT_TTL);
    }

    #[test]
    fn invalid_file_duration_is_a_parse_error() {
        let file = WrapperFile {
            ttl: Some(DurationValue::Text("soon".into())),
            ..Default::default()
        };
        let err = Settings::from_parts("claude", dirs(), &file, &RuntimeEnv::default()).unwrap_err();
        assert!(matches!(err, ShimError::ConfigParseError { .. }));
    }

    #[test]
    fn missing_remote_url_is_config_invalid() {
        let settings =
            Settings::from_parts("claude", dirs(), &WrapperFile::default(), &RuntimeEnv::default())
                .unwrap();
        let err = settings.require_remote_url().unwrap_err();
        assert!(matches!(err, ShimError::ConfigInvalid { .. }));
        assert!(err.to_string().contains("CLAUDE_ENV_URL"));
    }

    #[test]
    fn debug_zero_is_off() {
        let env = RuntimeEnv::from_vars([("CLAUDE_DEBUG", "0")]);
        assert!(!debug_requested("claude", &env));
        let env = RuntimeEnv::from_vars([("CLAUDE_DEBUG", "true")]);
        assert!(debug_requested("claude", &env));
    }

    #[test]
    fn invalid_local_key_is_rejected() {
        let file = WrapperFile {
            local_keys: Some(vec!["GOOD".into(), "not valid".into()]),
            ..Default::default()
        };
        let err = Settings::from_parts("claude", dirs(), &file, &RuntimeEnv::default()).unwrap_err();
        assert!(err.to_string().contains("not valid"));
    }
}
