//! Placing the `<bin>/<cmd>` entry that routes the command through envshim.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShimError};
use crate::resolver::canonicalize_or;

/// What [`place_shim`] found at the shim path and did about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimPlacement {
    /// Nothing was there.
    Created,
    /// An existing symlink was replaced.
    ReplacedSymlink { previous: PathBuf },
    /// An existing file was moved aside first.
    BackedUp { backup: PathBuf },
    /// An existing file was overwritten (`--force`).
    Overwritten,
}

/// Backup name for an existing file: `<path>.backup.<unix-millis>`.
pub fn backup_path(path: &Path) -> PathBuf {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".backup.{millis}"));
    PathBuf::from(name)
}

/// Point `shim` at `target` (the running envshim executable).
///
/// Refuses to touch `protected`, the real binary the shim will wrap, so a
/// real binary installed into the bin directory is never moved aside.
pub fn place_shim(shim: &Path, target: &Path, protected: &Path, force: bool) -> Result<ShimPlacement> {
    let placement = match fs::symlink_metadata(shim) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => ShimPlacement::Created,
        Err(e) => return Err(e.into()),
        Ok(meta) => {
            if canonicalize_or(shim) == canonicalize_or(protected) {
                return Err(ShimError::ConfigInvalid {
                    message: format!(
                        "{} is the real binary; choose a different --bin-dir",
                        shim.display()
                    ),
                });
            }

            if meta.file_type().is_symlink() {
                let previous = fs::read_link(shim)?;
                fs::remove_file(shim)?;
                ShimPlacement::ReplacedSymlink { previous }
            } else if force {
                fs::remove_file(shim)?;
                ShimPlacement::Overwritten
            } else {
                let backup = backup_path(shim);
                fs::rename(shim, &backup)?;
                ShimPlacement::BackedUp { backup }
            }
        }
    };

    link(target, shim)?;
    tracing::debug!("Linked {} -> {}", shim.display(), target.display());
    Ok(placement)
}

#[cfg(unix)]
fn link(target: &Path, shim: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, shim)
}

#[cfg(not(unix))]
fn link(target: &Path, shim: &Path) -> io::Result<()> {
    fs::copy(target, shim).map(|_| ())
}
