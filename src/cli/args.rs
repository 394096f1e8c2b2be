//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. These arguments are only
//! parsed in management mode; in wrapper mode every argument belongs to the
//! wrapped command.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::ffi::OsString;
use std::path::PathBuf;

/// envshim - inject centrally managed environment into a command-line tool.
#[derive(Debug, Parser)]
#[command(name = "envshim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a command through the wrapper
    Exec(ExecArgs),

    /// Show the wrapper state for a command
    Status(StatusArgs),

    /// Fetch the remote configuration now, ignoring the TTL
    Refresh(TargetArgs),

    /// Delete the cached remote configuration
    Clear(TargetArgs),

    /// Install the wrapper for a command
    Install(InstallArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `exec` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ExecArgs {
    /// Command to wrap
    pub command: String,

    /// Arguments passed to the command unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StatusArgs {
    /// Wrapped command
    pub command: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments naming a single wrapped command.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Wrapped command
    pub command: String,
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, clap::Args)]
pub struct InstallArgs {
    /// Command to wrap
    pub command: String,

    /// URL of the remote environment script
    #[arg(long, value_name = "URL")]
    pub remote_url: Option<String>,

    /// Value for the endpoint override
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Value for the secret reference override
    #[arg(long, value_name = "REF")]
    pub secret_ref: Option<String>,

    /// Directory for the wrapper link (default: ~/.local/bin)
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<PathBuf>,

    /// Overwrite an existing file without a backup
    #[arg(long)]
    pub force: bool,

    /// Do not edit the shell profile
    #[arg(long)]
    pub no_modify_path: bool,

    /// Use flags and existing values, no prompts
    #[arg(long)]
    pub non_interactive: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
