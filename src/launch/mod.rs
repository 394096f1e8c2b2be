//! Handing control to the real binary.
//!
//! On Unix the wrapper process is replaced with `exec`, so signals, the exit
//! status and the terminal go straight to the real tool. Elsewhere the tool
//! runs as a child and its exit code is forwarded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::environment::ChildEnv;
use crate::error::{Result, ShimError};

/// A fully prepared launch of the real binary.
#[derive(Debug, Clone)]
pub struct Launch {
    program: PathBuf,
    args: Vec<OsString>,
    env: ChildEnv,
}

impl Launch {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>, env: ChildEnv) -> Self {
        Self {
            program: program.into(),
            args,
            env,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn env(&self) -> &ChildEnv {
        &self.env
    }

    /// The command with exactly the composed environment and the forwarded
    /// arguments.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).env_clear().envs(self.env.iter());
        cmd
    }

    /// Replace this process with the real binary.
    ///
    /// Only returns on failure.
    #[cfg(unix)]
    pub fn run(self) -> Result<u8> {
        use std::os::unix::process::CommandExt;

        tracing::debug!("exec {}", self.program.display());
        let source = self.command().exec();
        Err(ShimError::LaunchFailed {
            program: self.program,
            source,
        })
    }

    /// Run the real binary as a child and forward its exit code.
    #[cfg(not(unix))]
    pub fn run(self) -> Result<u8> {
        self.wait()
    }

    /// Run the real binary as a child process and return its exit code.
    pub fn wait(self) -> Result<u8> {
        tracing::debug!("spawn {}", self.program.display());
        let status = self
            .command()
            .status()
            .map_err(|source| ShimError::LaunchFailed {
                program: self.program.clone(),
                source,
            })?;

        Ok(match status.code() {
            Some(code) => (code & 0xff) as u8,
            None => signal_exit_code(&status),
        })
    }
}

#[cfg(unix)]
fn signal_exit_code(status: &std::process::ExitStatus) -> u8 {
    use std::os::unix::process::ExitStatusExt;
    status
        .signal()
        .map(|sig| (128 + sig) as u8)
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: &std::process::ExitStatus) -> u8 {
    1
}
