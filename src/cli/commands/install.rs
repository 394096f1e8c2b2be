//! Install command implementation.

use crate::cli::args::InstallArgs;
use crate::config::{RuntimeEnv, Settings};
use crate::error::Result;
use crate::fetch::HttpFetcher;
use crate::install::{install, InstallOptions};
use crate::resolver::{BinaryResolver, SelfIdentity};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    env: RuntimeEnv,
    args: InstallArgs,
}

impl InstallCommand {
    pub fn new(env: &RuntimeEnv, args: InstallArgs) -> Self {
        Self {
            env: env.clone(),
            args,
        }
    }

    fn options(&self) -> InstallOptions {
        InstallOptions {
            command: self.args.command.clone(),
            remote_url: self.args.remote_url.clone(),
            endpoint: self.args.endpoint.clone(),
            secret_ref: self.args.secret_ref.clone(),
            bin_dir: self.args.bin_dir.clone(),
            force: self.args.force,
            modify_path: !self.args.no_modify_path,
            interactive: !self.args.non_interactive,
        }
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = Settings::load(&self.args.command, &self.env)?;
        let identity = SelfIdentity::current()?;
        let resolver = BinaryResolver::new(self.env.search_path(), identity.clone());
        let fetcher = HttpFetcher::new(settings.fetch)?;

        let report = install(
            &self.options(),
            &self.env,
            &resolver,
            fetcher,
            identity.path(),
            ui,
        )?;

        ui.success("Installation complete!");
        ui.message(&format!(
            "  `{}` now runs through {}",
            self.args.command,
            report.shim.display()
        ));
        ui.message(&format!(
            "  Debug: {}_DEBUG=1 {}",
            crate::config::env_prefix(&self.args.command),
            self.args.command
        ));
        ui.message(&format!(
            "  Force refresh: envshim refresh {}",
            self.args.command
        ));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> InstallArgs {
        InstallArgs {
            command: "claude".into(),
            remote_url: None,
            endpoint: Some("https://llm.example.com".into()),
            secret_ref: None,
            bin_dir: Some(PathBuf::from("/opt/bin")),
            force: true,
            no_modify_path: true,
            non_interactive: true,
        }
    }

    #[test]
    fn flags_map_to_options() {
        let options = InstallCommand::new(&RuntimeEnv::default(), args()).options();

        assert_eq!(options.command, "claude");
        assert_eq!(options.endpoint.as_deref(), Some("https://llm.example.com"));
        assert_eq!(options.bin_dir, Some(PathBuf::from("/opt/bin")));
        assert!(options.force);
        assert!(!options.modify_path);
        assert!(!options.interactive);
    }
}
