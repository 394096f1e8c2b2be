//! Remote configuration caching.
//!
//! This module keeps a local copy of the remote environment script with
//! TTL-based staleness (from the file's modification time), atomic refresh,
//! and fallback to the last good copy when the network is unavailable.

pub mod atomic;
pub mod freshness;
pub mod manager;

pub use atomic::{create_private_dir, sweep_orphans, write_atomic, AtomicWriter, OWNER_ONLY, WORLD_READABLE};
pub use freshness::{format_duration, parse_ttl, CacheFreshness};
pub use manager::{clear_cache, CacheStatus, ConfigCache, DEFAULT_TTL};

/// File name of the cached remote script inside the cache directory.
pub const CACHE_FILE_NAME: &str = "env-remote.sh";
