//! Atomic file replacement.
//!
//! [`AtomicWriter`] is a scoped temp file in the target's directory: writes
//! go to the temp file, [`AtomicWriter::commit`] renames it over the target,
//! and dropping it without committing removes it. Readers of the target only
//! ever see the old complete file or the new complete file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;

use crate::error::{Result, ShimError};

/// Owner read/write.
pub const OWNER_ONLY: u32 = 0o600;
/// Owner read/write, world readable.
pub const WORLD_READABLE: u32 = 0o644;

/// A pending replacement of `target`.
///
/// # Example
///
/// ```no_run
/// use envshim::cache::{AtomicWriter, OWNER_ONLY};
/// use std::io::Write;
/// use std::path::Path;
///
/// let mut writer = AtomicWriter::create(Path::new("/tmp/cache/env-remote.sh"), OWNER_ONLY).unwrap();
/// writer.write_all(b"export A=1\n").unwrap();
/// writer.commit().unwrap();
/// ```
pub struct AtomicWriter {
    target: PathBuf,
    mode: u32,
    temp: NamedTempFile,
}

impl AtomicWriter {
    /// Start replacing `target`, creating its directory if needed.
    ///
    /// The temp file is named `.<target-name>.<random>.tmp` and lives next to
    /// the target so the final rename stays on one filesystem.
    pub fn create(target: &Path, mode: u32) -> Result<Self> {
        let fail = |source: io::Error| ShimError::CacheWriteFailed {
            path: target.to_path_buf(),
            source,
        };

        let dir = parent_dir(target);
        create_private_dir(dir).map_err(fail)?;

        let temp = tempfile::Builder::new()
            .prefix(&temp_prefix(target))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(fail)?;
        set_mode(temp.path(), mode).map_err(fail)?;

        Ok(Self {
            target: target.to_path_buf(),
            mode,
            temp,
        })
    }

    /// The file that will be replaced on commit.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The temp file currently being written.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Flush, sync, and rename the temp file over the target.
    pub fn commit(mut self) -> Result<()> {
        let target = self.target.clone();
        let fail = |source: io::Error| ShimError::CacheWriteFailed {
            path: target.clone(),
            source,
        };

        self.temp.flush().map_err(fail)?;
        self.temp.as_file().sync_all().map_err(fail)?;
        set_mode(self.temp.path(), self.mode).map_err(fail)?;
        self.temp
            .persist(&self.target)
            .map_err(|e| fail(e.error))?;

        tracing::debug!("Replaced {}", target.display());
        Ok(())
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

/// Atomically replace `target` with `contents`.
pub fn write_atomic(target: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let mut writer = AtomicWriter::create(target, mode)?;
    writer
        .write_all(contents)
        .map_err(|source| ShimError::CacheWriteFailed {
            path: target.to_path_buf(),
            source,
        })?;
    writer.commit()
}

/// Remove temp files for `target` left behind by interrupted writers.
///
/// Only files older than `older_than` are touched, so in-flight writers in
/// other processes are left alone. Returns the number removed.
pub fn sweep_orphans(target: &Path, older_than: Duration) -> usize {
    let prefix = temp_prefix(target);
    let Ok(entries) = fs::read_dir(parent_dir(target)) else {
        return 0;
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(&prefix) || !name.ends_with(".tmp") {
            continue;
        }
        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if age.is_some_and(|age| age >= older_than) && fs::remove_file(entry.path()).is_ok() {
            tracing::debug!("Removed orphaned temp file {}", entry.path().display());
            removed += 1;
        }
    }
    removed
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn temp_prefix(target: &Path) -> String {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "envshim".to_string());
    format!(".{}.", name)
}

/// Create `dir` (and parents) owner-only if it does not exist yet.
pub fn create_private_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
