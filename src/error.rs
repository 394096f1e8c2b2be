//! Error types for envshim operations.
//!
//! This module defines [`ShimError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `ShimError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `ShimError::Other`) for unexpected errors
//! - Every fatal error maps to a wrapper exit code via [`ShimError::exit_code`]
//! - All errors should read as a single actionable line for users

use std::path::PathBuf;
use thiserror::Error;

/// Exit code when the real binary cannot be located.
pub const EXIT_BINARY_NOT_FOUND: u8 = 127;
/// Exit code when the real binary exists but could not be launched.
pub const EXIT_LAUNCH_FAILED: u8 = 126;
/// Exit code when no configuration could be fetched and none is cached.
pub const EXIT_UNAVAILABLE: u8 = 69;
/// Exit code when the cache file could not be written.
pub const EXIT_CANT_CREATE: u8 = 73;
/// Exit code for configuration problems.
pub const EXIT_CONFIG: u8 = 78;
/// Exit code for anything else.
pub const EXIT_SOFTWARE: u8 = 70;

/// Core error type for envshim operations.
#[derive(Debug, Error)]
pub enum ShimError {
    /// Only the wrapper itself (or nothing) matched the command on the search path.
    #[error("Cannot find the real `{command}` binary on PATH")]
    BinaryNotFound { command: String },

    /// The remote configuration could not be fetched.
    #[error("Cannot fetch config from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// The redirect chain was longer than the configured bound.
    #[error("Cannot fetch config from {url}: more than {limit} redirects")]
    RedirectLoopExceeded { url: String, limit: usize },

    /// Installing fetched content into the cache failed.
    #[error("Cannot write cache file {path}: {source}")]
    CacheWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid or missing configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    /// The cached environment script could not be loaded.
    #[error("Cannot load environment from {path}: {message}")]
    EnvLoadFailed { path: PathBuf, message: String },

    /// The real binary was found but could not be started.
    #[error("Cannot launch {program}: {source}")]
    LaunchFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShimError {
    /// Whether this error is a failed fetch (recoverable when a cache exists).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::RedirectLoopExceeded { .. }
        )
    }

    /// Process exit code the wrapper uses for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::BinaryNotFound { .. } => EXIT_BINARY_NOT_FOUND,
            Self::FetchFailed { .. } | Self::RedirectLoopExceeded { .. } => EXIT_UNAVAILABLE,
            Self::CacheWriteFailed { .. } => EXIT_CANT_CREATE,
            Self::ConfigParseError { .. }
            | Self::ConfigInvalid { .. }
            | Self::EnvLoadFailed { .. } => EXIT_CONFIG,
            Self::LaunchFailed { .. } => EXIT_LAUNCH_FAILED,
            Self::Io(_) | Self::Other(_) => EXIT_SOFTWARE,
        }
    }
}

/// Result type alias for envshim operations.
pub type Result<T> = std::result::Result<T, ShimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_not_found_names_the_command() {
        let err = ShimError::BinaryNotFound {
            command: "claude".into(),
        };
        assert!(err.to_string().contains("`claude`"));
        assert_eq!(err.exit_code(), EXIT_BINARY_NOT_FOUND);
    }

    #[test]
    fn fetch_failed_displays_url_and_reason() {
        let err = ShimError::FetchFailed {
            url: "https://example.com/env.sh".into(),
            reason: "HTTP 503".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/env.sh"));
        assert!(msg.contains("HTTP 503"));
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn redirect_loop_counts_as_fetch_failure() {
        let err = ShimError::RedirectLoopExceeded {
            url: "https://example.com/loop".into(),
            limit: 10,
        };
        assert!(err.is_fetch_failure());
        assert!(err.to_string().contains("more than 10 redirects"));
        assert_eq!(err.exit_code(), EXIT_UNAVAILABLE);
    }

    #[test]
    fn cache_write_failed_displays_path() {
        let err = ShimError::CacheWriteFailed {
            path: PathBuf::from("/cache/env-remote.sh"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/cache/env-remote.sh"));
        assert!(!err.is_fetch_failure());
        assert_eq!(err.exit_code(), EXIT_CANT_CREATE);
    }

    #[test]
    fn config_errors_share_exit_code() {
        let parse = ShimError::ConfigParseError {
            path: PathBuf::from("/cfg/wrapper.yml"),
            message: "bad".into(),
        };
        let invalid = ShimError::ConfigInvalid {
            message: "no remote URL".into(),
        };
        assert_eq!(parse.exit_code(), EXIT_CONFIG);
        assert_eq!(invalid.exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ShimError = io_err.into();
        assert!(matches!(err, ShimError::Io(_)));
        assert_eq!(err.exit_code(), EXIT_SOFTWARE);
    }

    #[test]
    fn wrapper_codes_are_distinct() {
        let codes = [
            EXIT_BINARY_NOT_FOUND,
            EXIT_LAUNCH_FAILED,
            EXIT_UNAVAILABLE,
            EXIT_CANT_CREATE,
            EXIT_CONFIG,
            EXIT_SOFTWARE,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
