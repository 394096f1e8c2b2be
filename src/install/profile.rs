//! Putting the wrapper's bin directory on `PATH`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::resolver::SearchPath;

/// Shells with a known startup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Other,
}

impl ShellType {
    /// Parse shell type from the `$SHELL` path.
    pub fn from_executable(exe: &str) -> Self {
        let name = Path::new(exe)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "bash" => ShellType::Bash,
            "zsh" => ShellType::Zsh,
            _ => ShellType::Other,
        }
    }
}

/// The startup file a PATH line should go into.
///
/// zsh uses `~/.zshrc`; bash uses `~/.bashrc` when it exists and
/// `~/.bash_profile` otherwise; anything else gets `~/.profile`.
pub fn detect_profile(shell: Option<&str>, home: &Path) -> PathBuf {
    match shell.map(ShellType::from_executable) {
        Some(ShellType::Zsh) => home.join(".zshrc"),
        Some(ShellType::Bash) => {
            let bashrc = home.join(".bashrc");
            if bashrc.exists() {
                bashrc
            } else {
                home.join(".bash_profile")
            }
        }
        _ => home.join(".profile"),
    }
}

/// Outcome of [`ensure_on_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathUpdate {
    /// The directory is already on the current `PATH`.
    AlreadyOnPath,
    /// The profile already mentions the directory.
    AlreadyInProfile(PathBuf),
    /// An export line was appended to the profile.
    Appended(PathBuf),
}

/// Append `export PATH="<bin_dir>:$PATH"` to `profile` unless `bin_dir` is
/// already reachable.
pub fn ensure_on_path(bin_dir: &Path, search_path: &SearchPath, profile: &Path) -> Result<PathUpdate> {
    if search_path.contains(bin_dir) {
        return Ok(PathUpdate::AlreadyOnPath);
    }

    let dir = bin_dir.to_string_lossy();
    match fs::read_to_string(profile) {
        Ok(content) if content.contains(dir.as_ref()) => {
            return Ok(PathUpdate::AlreadyInProfile(profile.to_path_buf()));
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut file = OpenOptions::new().create(true).append(true).open(profile)?;
    write!(file, "\nexport PATH=\"{}:$PATH\"\n", dir)?;
    tracing::debug!("Appended {} to PATH in {}", dir, profile.display());

    Ok(PathUpdate::Appended(profile.to_path_buf()))
}
