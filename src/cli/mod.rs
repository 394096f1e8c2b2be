//! Command-line interface for management mode.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ExecArgs, InstallArgs, StatusArgs, TargetArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
