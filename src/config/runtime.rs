//! Snapshot of the process environment.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::resolver::SearchPath;

/// The process environment captured once per invocation.
///
/// Settings resolution, path discovery and the child environment all read
/// from the same snapshot, and tests build one from a literal list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnv {
    vars: BTreeMap<OsString, OsString>,
}

impl RuntimeEnv {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value of a variable.
    pub fn var_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    /// UTF-8 value of a variable; empty and non-UTF-8 values count as unset.
    pub fn var(&self, key: impl AsRef<OsStr>) -> Option<&str> {
        self.var_os(key)
            .and_then(OsStr::to_str)
            .filter(|v| !v.is_empty())
    }

    /// Non-empty value as a path.
    pub fn path_var(&self, key: impl AsRef<OsStr>) -> Option<PathBuf> {
        self.var_os(key)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// The user's home directory, preferring `$HOME`.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.path_var("HOME").or_else(dirs::home_dir)
    }

    /// The `PATH` search list.
    pub fn search_path(&self) -> SearchPath {
        self.var_os("PATH")
            .map(SearchPath::parse)
            .unwrap_or_default()
    }

    /// Owned copy of every variable, for composing a child environment.
    pub fn to_pairs(&self) -> Vec<(OsString, OsString)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
