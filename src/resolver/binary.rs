//! Real-binary resolution with self-exclusion.

use std::path::{Path, PathBuf};

use crate::error::{Result, ShimError};

use super::SearchPath;

/// Canonicalize a path, falling back to the path itself when that fails.
pub fn canonicalize_or(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The canonical location of the running wrapper, computed once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    canonical: PathBuf,
}

impl SelfIdentity {
    /// Identity of an executable at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            canonical: canonicalize_or(path.as_ref()),
        }
    }

    /// Identity of the currently running executable.
    pub fn current() -> Result<Self> {
        let exe = std::env::current_exe()?;
        Ok(Self::from_path(exe))
    }

    /// The canonical path of the wrapper.
    pub fn path(&self) -> &Path {
        &self.canonical
    }

    /// Whether `candidate` is the wrapper itself.
    ///
    /// A candidate that cannot be canonicalized is compared by its raw path.
    pub fn matches(&self, candidate: &Path) -> bool {
        canonicalize_or(candidate) == self.canonical
    }
}

/// Selects the genuine target executable for a command, skipping the wrapper.
///
/// # Example
///
/// ```no_run
/// use envshim::resolver::{BinaryResolver, SearchPath, SelfIdentity};
///
/// let resolver = BinaryResolver::new(SearchPath::from_env(), SelfIdentity::current().unwrap());
/// let real = resolver.resolve("claude").unwrap();
/// println!("real binary: {}", real.display());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryResolver {
    search_path: SearchPath,
    identity: SelfIdentity,
}

impl BinaryResolver {
    /// Create a resolver over a search path for a given wrapper identity.
    pub fn new(search_path: SearchPath, identity: SelfIdentity) -> Self {
        Self {
            search_path,
            identity,
        }
    }

    /// The search path being scanned.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// The wrapper identity being excluded.
    pub fn identity(&self) -> &SelfIdentity {
        &self.identity
    }

    /// Return the first candidate for `command` that is not the wrapper.
    pub fn resolve(&self, command: &str) -> Result<PathBuf> {
        let candidates = self.search_path.candidates(command);
        tracing::debug!(
            "Found {} candidate(s) for {}: {:?}",
            candidates.len(),
            command,
            candidates
        );

        for candidate in candidates {
            if self.identity.matches(&candidate) {
                tracing::debug!("Skipping {} (this wrapper)", candidate.display());
                continue;
            }
            tracing::debug!("Resolved {} to {}", command, candidate.display());
            return Ok(candidate);
        }

        Err(ShimError::BinaryNotFound {
            command: command.to_string(),
        })
    }
}
