//! Choosing between wrapper and management mode from `argv[0]`.

use std::ffi::OsStr;
use std::path::Path;

/// File name under which the binary runs its own CLI.
pub const MANAGEMENT_NAME: &str = "envshim";

/// How this process was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Invoked under another name: wrap that command.
    Wrapper { command: String },
    /// Invoked as `envshim`.
    Management,
}

/// Name of the wrapped command, or `None` in management mode.
///
/// The extension is stripped, so `claude.exe` wraps `claude`.
pub fn invoked_command(argv0: &OsStr) -> Option<String> {
    let stem = Path::new(argv0).file_stem()?.to_str()?;
    if stem.is_empty() || stem == MANAGEMENT_NAME {
        None
    } else {
        Some(stem.to_string())
    }
}

/// The mode for a given `argv[0]`.
pub fn detect_mode(argv0: Option<&OsStr>) -> Mode {
    match argv0.and_then(invoked_command) {
        Some(command) => Mode::Wrapper { command },
        None => Mode::Management,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symlink_name_selects_wrapper_mode() {
        assert_eq!(
            detect_mode(Some(OsStr::new("/home/u/.local/bin/claude"))),
            Mode::Wrapper {
                command: "claude".into()
            }
        );
    }

    #[test]
    fn own_name_selects_management_mode() {
        assert_eq!(detect_mode(Some(OsStr::new("envshim"))), Mode::Management);
        assert_eq!(
            detect_mode(Some(OsStr::new("/usr/local/bin/envshim"))),
            Mode::Management
        );
        assert_eq!(detect_mode(None), Mode::Management);
    }

    #[test]
    fn extension_is_stripped() {
        assert_eq!(invoked_command(OsStr::new("claude.exe")).as_deref(), Some("claude"));
        assert_eq!(invoked_command(OsStr::new("envshim.exe")), None);
    }
}
