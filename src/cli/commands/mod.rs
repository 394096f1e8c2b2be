//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations against one captured
//! [`RuntimeEnv`](crate::config::RuntimeEnv).

pub mod clear;
pub mod dispatcher;
pub mod exec;
pub mod install;
pub mod refresh;
pub mod status;

pub use dispatcher::{write_completions, Command, CommandDispatcher, CommandResult};
