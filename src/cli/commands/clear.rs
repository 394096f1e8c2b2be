//! Cache-bust for a wrapped command.

use crate::cache::clear_cache;
use crate::cli::args::TargetArgs;
use crate::config::{AppDirs, RuntimeEnv};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The clear command implementation.
pub struct ClearCommand {
    env: RuntimeEnv,
    args: TargetArgs,
}

impl ClearCommand {
    pub fn new(env: &RuntimeEnv, args: TargetArgs) -> Self {
        Self {
            env: env.clone(),
            args,
        }
    }
}

impl Command for ClearCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let dirs = AppDirs::for_command(&self.args.command, &self.env)?;
        let path = dirs.cache_file();

        if clear_cache(&path)? {
            ui.success(&format!("Removed {}", path.display()));
        } else {
            ui.message(&format!("No cache at {}", path.display()));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn command(temp: &TempDir) -> ClearCommand {
        let env = RuntimeEnv::from_vars([
            ("HOME", temp.path().to_path_buf()),
            ("XDG_CACHE_HOME", temp.path().join("cache")),
        ]);
        ClearCommand::new(
            &env,
            TargetArgs {
                command: "tool".into(),
            },
        )
    }

    #[test]
    fn removes_existing_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache/tool/env-remote.sh");
        fs::create_dir_all(cache.parent().unwrap()).unwrap();
        fs::write(&cache, "A=1\n").unwrap();

        let mut ui = MockUI::new();
        let result = command(&temp).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(!cache.exists());
        assert_eq!(ui.successes().len(), 1);
    }

    #[test]
    fn missing_cache_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = command(&temp).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.messages()[0].starts_with("No cache at"));
    }
}
