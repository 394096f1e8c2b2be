//! Cache freshness and TTL handling.

use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};

/// How old the cache file is relative to its TTL.
///
/// Derived from the file's modification time on every call; nothing is
/// stored alongside the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFreshness {
    /// No cache file exists.
    Missing,
    /// The cache is younger than the TTL.
    Fresh { age: Duration },
    /// The cache is at least as old as the TTL.
    Stale { age: Duration },
}

impl CacheFreshness {
    /// Inspect `path` against `ttl` using the current time.
    pub fn check(path: &Path, ttl: Duration) -> Self {
        Self::check_at(path, ttl, SystemTime::now())
    }

    /// Inspect `path` against `ttl` as of `now`.
    ///
    /// A modification time in the future counts as age zero.
    pub fn check_at(path: &Path, ttl: Duration, now: SystemTime) -> Self {
        let modified = match path.metadata() {
            Ok(meta) if meta.is_file() => meta.modified().ok(),
            _ => return Self::Missing,
        };

        let age = modified
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or(Duration::ZERO);

        if age >= ttl {
            Self::Stale { age }
        } else {
            Self::Fresh { age }
        }
    }

    /// Whether no fetch is needed.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh { .. })
    }

    /// Age of the cache file, if it exists.
    pub fn age(&self) -> Option<Duration> {
        match self {
            Self::Missing => None,
            Self::Fresh { age } | Self::Stale { age } => Some(*age),
        }
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Fresh { .. } => "fresh",
            Self::Stale { .. } => "stale",
        }
    }
}

/// Parse a duration string like "300", "45s", "5m", "1h", "7d" or "250ms".
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();

    let parse = |n: &str| -> Result<u64> {
        n.trim()
            .parse()
            .with_context(|| format!("Invalid duration '{}'", ttl))
    };

    let scaled = |n: &str, unit: u64| -> Result<Duration> {
        parse(n)?
            .checked_mul(unit)
            .map(Duration::from_secs)
            .with_context(|| format!("Invalid duration '{}': too large", ttl))
    };

    if let Some(millis) = ttl.strip_suffix("ms") {
        Ok(Duration::from_millis(parse(millis)?))
    } else if let Some(days) = ttl.strip_suffix('d') {
        scaled(days, 86400)
    } else if let Some(hours) = ttl.strip_suffix('h') {
        scaled(hours, 3600)
    } else if let Some(mins) = ttl.strip_suffix('m') {
        scaled(mins, 60)
    } else if let Some(secs) = ttl.strip_suffix('s') {
        Ok(Duration::from_secs(parse(secs)?))
    } else {
        // Assume seconds if no suffix
        Ok(Duration::from_secs(parse(&ttl)?))
    }
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
