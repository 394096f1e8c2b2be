//! Search path enumeration.
//!
//! Lists every executable with a given name across the directories of a
//! search path, in order, the way `which -a` does. Does NOT shell out to
//! `which`: its behavior varies across systems and it is sometimes a shell
//! builtin.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// An ordered list of directories to search for executables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Create a search path from explicit directories.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Parse a platform-delimited directory list (`:` on Unix, `;` on Windows).
    ///
    /// Empty entries are dropped.
    pub fn parse(value: &OsStr) -> Self {
        let dirs = std::env::split_paths(value)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        Self { dirs }
    }

    /// Read the search path from the process `PATH` variable.
    pub fn from_env() -> Self {
        std::env::var_os("PATH")
            .map(|path| Self::parse(&path))
            .unwrap_or_default()
    }

    /// Directories in priority order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Whether `dir` is one of the search path entries.
    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.iter().any(|d| d == dir)
    }

    /// All executables named `name`, in search-path order.
    ///
    /// Duplicates are kept when a directory appears more than once.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for dir in &self.dirs {
            for file_name in executable_names(name) {
                let candidate = dir.join(&file_name);
                if candidate.is_file() && is_executable(&candidate) {
                    found.push(candidate);
                }
            }
        }
        found
    }
}

#[cfg(unix)]
fn executable_names(name: &str) -> Vec<OsString> {
    vec![OsString::from(name)]
}

#[cfg(not(unix))]
fn executable_names(name: &str) -> Vec<OsString> {
    if Path::new(name).extension().is_some() {
        return vec![OsString::from(name)];
    }
    let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    pathext
        .split(';')
        .filter(|ext| !ext.is_empty())
        .map(|ext| OsString::from(format!("{}{}", name, ext.to_lowercase())))
        .collect()
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}
