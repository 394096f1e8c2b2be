//! Routing from parsed arguments to management subcommands.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::{Cli, Commands};
use crate::config::RuntimeEnv;
use crate::error::Result;
use crate::runner::MANAGEMENT_NAME;
use crate::ui::UserInterface;

/// A management subcommand, constructed from its clap arguments.
pub trait Command {
    /// Run to completion, reporting through `ui`.
    ///
    /// Errors are fatal and mapped to an exit code by the caller; a command
    /// that finishes but wants a non-zero exit returns
    /// [`CommandResult::failure`].
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// How a subcommand finished.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: u8,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: u8) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Result for a forwarded exit code.
    pub fn from_exit_code(exit_code: u8) -> Self {
        if exit_code == 0 {
            Self::success()
        } else {
            Self::failure(exit_code)
        }
    }
}

/// Owns the captured environment and hands it to each subcommand.
pub struct CommandDispatcher {
    env: RuntimeEnv,
}

impl CommandDispatcher {
    /// Create a dispatcher reading from `env`.
    pub fn new(env: RuntimeEnv) -> Self {
        Self { env }
    }

    /// The environment commands run against.
    pub fn env(&self) -> &RuntimeEnv {
        &self.env
    }

    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Exec(args) => {
                let cmd = super::exec::ExecCommand::new(&self.env, args.clone());
                cmd.execute(ui)
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(&self.env, args.clone());
                cmd.execute(ui)
            }
            Commands::Refresh(args) => {
                let cmd = super::refresh::RefreshCommand::new(&self.env, args.clone());
                cmd.execute(ui)
            }
            Commands::Clear(args) => {
                let cmd = super::clear::ClearCommand::new(&self.env, args.clone());
                cmd.execute(ui)
            }
            Commands::Install(args) => {
                let cmd = super::install::InstallCommand::new(&self.env, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                write_completions(args.shell, &mut std::io::stdout());
                Ok(CommandResult::success())
            }
        }
    }
}

/// Completion script for the management CLI.
pub fn write_completions(shell: Shell, out: &mut dyn std::io::Write) {
    clap_complete::generate(shell, &mut Cli::command(), MANAGEMENT_NAME, out);
}
