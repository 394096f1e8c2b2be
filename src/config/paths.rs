//! Per-command directory layout.

use std::path::{Path, PathBuf};

use super::RuntimeEnv;
use crate::cache::CACHE_FILE_NAME;
use crate::error::{Result, ShimError};

/// Settings file in the config directory.
pub const WRAPPER_FILE_NAME: &str = "wrapper.yml";
/// User override file in the config directory.
pub const LOCAL_FILE_NAME: &str = "local.env";
/// Optional script sourced after the local overrides.
pub const MIDDLEWARE_FILE_NAME: &str = "middleware.sh";

/// Where a wrapped command keeps its configuration and cache.
///
/// * config: `${XDG_CONFIG_HOME:-$HOME/.config}/<cmd>/`
/// * cache: `${XDG_CACHE_HOME:-$HOME/.cache}/<cmd>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config_dir: PathBuf,
    cache_dir: PathBuf,
}

impl AppDirs {
    pub fn new(config_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Discover the directories for `command` from the environment.
    pub fn for_command(command: &str, env: &RuntimeEnv) -> Result<Self> {
        let base = |xdg: &str, fallback: &str| -> Result<PathBuf> {
            if let Some(dir) = env.path_var(xdg).filter(|d| d.is_absolute()) {
                return Ok(dir);
            }
            env.home_dir()
                .map(|home| home.join(fallback))
                .ok_or_else(|| ShimError::ConfigInvalid {
                    message: format!("neither {xdg} nor HOME is set"),
                })
        };

        Ok(Self::new(
            base("XDG_CONFIG_HOME", ".config")?.join(command),
            base("XDG_CACHE_HOME", ".cache")?.join(command),
        ))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn wrapper_file(&self) -> PathBuf {
        self.config_dir.join(WRAPPER_FILE_NAME)
    }

    pub fn local_file(&self) -> PathBuf {
        self.config_dir.join(LOCAL_FILE_NAME)
    }

    pub fn middleware_file(&self) -> PathBuf {
        self.config_dir.join(MIDDLEWARE_FILE_NAME)
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_dirs_take_priority() {
        let env = RuntimeEnv::from_vars([
            ("HOME", "/home/u"),
            ("XDG_CONFIG_HOME", "/xdg/config"),
            ("XDG_CACHE_HOME", "/xdg/cache"),
        ]);
        let dirs = AppDirs::for_command("claude", &env).unwrap();

        assert_eq!(dirs.config_dir(), Path::new("/xdg/config/claude"));
        assert_eq!(
            dirs.cache_file(),
            PathBuf::from("/xdg/cache/claude/env-remote.sh")
        );
    }

    #[test]
    fn falls_back_to_home() {
        let env = RuntimeEnv::from_vars([("HOME", "/home/u"), ("XDG_CONFIG_HOME", "")]);
        let dirs = AppDirs::for_command("claude", &env).unwrap();

        assert_eq!(
            dirs.wrapper_file(),
            PathBuf::from("/home/u/.config/claude/wrapper.yml")
        );
        assert_eq!(dirs.local_file(), PathBuf::from("/home/u/.config/claude/local.env"));
        assert_eq!(
            dirs.middleware_file(),
            PathBuf::from("/home/u/.config/claude/middleware.sh")
        );
        assert_eq!(dirs.cache_dir(), Path::new("/home/u/.cache/claude"));
    }

    #[test]
    fn relative_xdg_dir_is_ignored() {
        let env = RuntimeEnv::from_vars([("HOME", "/home/u"), ("XDG_CACHE_HOME", "rel/cache")]);
        let dirs = AppDirs::for_command("tool", &env).unwrap();
        assert_eq!(dirs.cache_dir(), Path::new("/home/u/.cache/tool"));
    }
}
