//! Forced fetch of the remote configuration.

use crate::cache::{CacheStatus, ConfigCache};
use crate::cli::args::TargetArgs;
use crate::config::{RuntimeEnv, Settings};
use crate::error::{Result, EXIT_UNAVAILABLE};
use crate::fetch::HttpFetcher;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The refresh command implementation.
pub struct RefreshCommand {
    env: RuntimeEnv,
    args: TargetArgs,
}

impl RefreshCommand {
    pub fn new(env: &RuntimeEnv, args: TargetArgs) -> Self {
        Self {
            env: env.clone(),
            args,
        }
    }
}

impl Command for RefreshCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = Settings::load(&self.args.command, &self.env)?;
        let cache = ConfigCache::new(
            settings.dirs.cache_file(),
            settings.require_remote_url()?,
            settings.ttl,
            HttpFetcher::new(settings.fetch)?,
        );

        match cache.refresh()? {
            CacheStatus::Refreshed { bytes } => {
                ui.success(&format!(
                    "Refreshed {} ({} bytes)",
                    cache.path().display(),
                    bytes
                ));
                Ok(CommandResult::success())
            }
            CacheStatus::StaleButPresent { reason } => {
                ui.warning(&format!("{reason}; kept existing cache"));
                Ok(CommandResult::failure(EXIT_UNAVAILABLE))
            }
            CacheStatus::Fresh => Ok(CommandResult::success()),
        }
    }
}
