//! Explicit wrapper invocation.
//!
//! `envshim exec <cmd> [ARGS]...` behaves exactly like running the `<cmd>`
//! link, for use before the link exists.

use crate::cli::args::ExecArgs;
use crate::config::RuntimeEnv;
use crate::error::Result;
use crate::runner::run_wrapper;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The exec command implementation.
pub struct ExecCommand {
    env: RuntimeEnv,
    args: ExecArgs,
}

impl ExecCommand {
    pub fn new(env: &RuntimeEnv, args: ExecArgs) -> Self {
        Self {
            env: env.clone(),
            args,
        }
    }
}

impl Command for ExecCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let code = run_wrapper(&self.args.command, self.args.args.clone(), self.env.clone())?;
        Ok(CommandResult::from_exit_code(code))
    }
}
