//! Configuration for a wrapped command.
//!
//! Defaults are overlaid by `wrapper.yml`, which is overlaid by
//! command-prefixed environment variables. [`AppDirs`] decides where the
//! settings, overrides and cache live.

pub mod file;
pub mod local;
pub mod paths;
pub mod runtime;
pub mod settings;

pub use file::{DurationValue, WrapperFile};
pub use local::LocalOverrideConfig;
pub use paths::{AppDirs, LOCAL_FILE_NAME, MIDDLEWARE_FILE_NAME, WRAPPER_FILE_NAME};
pub use runtime::RuntimeEnv;
pub use settings::{
    debug_requested, env_prefix, Settings, DEFAULT_LOCAL_KEYS, DEFAULT_SECRET_REF_PREFIX,
};
