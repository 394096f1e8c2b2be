//! Remote configuration cache manager.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ShimError};
use crate::fetch::Fetcher;

use super::atomic::{sweep_orphans, AtomicWriter, OWNER_ONLY};
use super::freshness::CacheFreshness;

/// Default cache TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Temp files older than this are assumed to belong to a dead writer.
const ORPHAN_AGE: Duration = Duration::from_secs(3600);

/// Outcome of [`ConfigCache::ensure_fresh`] when a usable cache exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// The cache was younger than the TTL; no network access happened.
    Fresh,
    /// The cache was stale or missing and has just been replaced.
    Refreshed { bytes: u64 },
    /// The refresh failed; the previous cache file is used as-is.
    StaleButPresent { reason: String },
}

impl CacheStatus {
    /// Whether the cache is being used past its TTL.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleButPresent { .. })
    }
}

/// Keeps a local copy of a remote configuration file up to date.
///
/// Concurrent invocations are not coordinated: two processes may both see a
/// stale cache and both fetch. Each writes its own temp file and renames it
/// into place, so the last writer wins and no reader sees a partial file.
///
/// # Example
///
/// ```no_run
/// use envshim::cache::ConfigCache;
/// use envshim::fetch::{FetchOptions, HttpFetcher};
/// use std::time::Duration;
///
/// let fetcher = HttpFetcher::new(FetchOptions::default()).unwrap();
/// let cache = ConfigCache::new(
///     "/home/me/.cache/claude/env-remote.sh",
///     "https://example.com/env.sh",
///     Duration::from_secs(300),
///     &fetcher,
/// );
/// let status = cache.ensure_fresh().unwrap();
/// println!("{:?}", status);
/// ```
pub struct ConfigCache<F: Fetcher> {
    path: PathBuf,
    url: String,
    ttl: Duration,
    fetcher: F,
}

impl<F: Fetcher> ConfigCache<F> {
    /// Create a cache manager for one cache file and remote URL.
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>, ttl: Duration, fetcher: F) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            ttl,
            fetcher,
        }
    }

    /// The cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remote source.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current freshness of the cache file.
    pub fn freshness(&self) -> CacheFreshness {
        CacheFreshness::check(&self.path, self.ttl)
    }

    /// Make sure a usable cache file exists, refreshing it when stale.
    ///
    /// Errors only when nothing usable remains: the fetch failed and no
    /// cache file exists, or the fetched payload could not be installed.
    pub fn ensure_fresh(&self) -> Result<CacheStatus> {
        let freshness = self.freshness();
        tracing::debug!(
            "Cache {} is {} (ttl {}s)",
            self.path.display(),
            freshness.label(),
            self.ttl.as_secs()
        );

        if freshness.is_fresh() {
            return Ok(CacheStatus::Fresh);
        }

        self.fetch_or_fall_back()
    }

    /// Fetch now regardless of the TTL, falling back like [`ensure_fresh`].
    ///
    /// [`ensure_fresh`]: ConfigCache::ensure_fresh
    pub fn refresh(&self) -> Result<CacheStatus> {
        self.fetch_or_fall_back()
    }

    fn fetch_or_fall_back(&self) -> Result<CacheStatus> {
        match self.fetch() {
            Ok(bytes) => Ok(CacheStatus::Refreshed { bytes }),
            Err(err) if err.is_fetch_failure() => {
                // Checked again: another invocation may have installed or removed it.
                if !self.path.is_file() {
                    return Err(err);
                }
                tracing::warn!("{}; using cached config from {}", err, self.path.display());
                Ok(CacheStatus::StaleButPresent {
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Download into a temp file and install it over the cache.
    fn fetch(&self) -> Result<u64> {
        let mut writer = AtomicWriter::create(&self.path, OWNER_ONLY)?;
        tracing::debug!("Fetching {} into {}", self.url, writer.temp_path().display());

        // On error the writer is dropped here, which deletes the temp file.
        let bytes = self.fetcher.fetch_into(&self.url, &mut writer)?;
        writer.commit()?;

        let swept = sweep_orphans(&self.path, ORPHAN_AGE);
        if swept > 0 {
            tracing::debug!("Swept {} orphaned temp file(s)", swept);
        }
        Ok(bytes)
    }
}

/// Delete the cache file, forcing a fetch on the next invocation.
///
/// Returns whether a file was removed.
pub fn clear_cache(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ShimError::Io(e)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::Cell;
    use std::io::Write;

    use crate::error::{Result, ShimError};
    use crate::fetch::Fetcher;

    /// A [`Fetcher`] double that counts calls and replays a fixed outcome.
    pub struct CountingFetcher {
        calls: Cell<usize>,
        body: Option<Vec<u8>>,
    }

    impl CountingFetcher {
        /// A fetcher that always serves `body`.
        pub fn serving(body: &str) -> Self {
            Self {
                calls: Cell::new(0),
                body: Some(body.as_bytes().to_vec()),
            }
        }

        /// A fetcher whose network is always down.
        pub fn unreachable() -> Self {
            Self {
                calls: Cell::new(0),
                body: None,
            }
        }

        /// Number of fetches attempted.
        pub fn calls(&self) -> usize {
            self.calls.get()
        }
    }

    impl Fetcher for CountingFetcher {
        fn fetch_into(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
            self.calls.set(self.calls.get() + 1);
            match &self.body {
                Some(body) => {
                    sink.write_all(body)?;
                    Ok(body.len() as u64)
                }
                None => {
                    // Leave a partial body behind to prove it gets discarded.
                    sink.write_all(b"export PARTI")?;
                    Err(ShimError::FetchFailed {
                        url: url.to_string(),
                        reason: "connection refused".to_string(),
                    })
                }
            }
        }
    }
}
