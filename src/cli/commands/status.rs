//! Status command implementation.
//!
//! Shows which binary a wrapped command resolves to and the state of its
//! cached configuration.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cache::{format_duration, CacheFreshness};
use crate::cli::args::StatusArgs;
use crate::config::{LocalOverrideConfig, RuntimeEnv, Settings};
use crate::error::Result;
use crate::resolver::{BinaryResolver, SelfIdentity};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Everything `status` reports, also the `--json` shape.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub command: String,
    pub binary: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub cache_file: PathBuf,
    pub cache_state: &'static str,
    pub cache_age_secs: Option<u64>,
    pub last_refreshed: Option<DateTime<Local>>,
    pub ttl_secs: u64,
    pub loader: &'static str,
    pub local_file: PathBuf,
    pub local_overrides: BTreeMap<String, String>,
}

impl StatusReport {
    /// Collect the report; a missing binary is reported, not an error.
    pub fn collect(settings: &Settings, resolver: &BinaryResolver) -> Result<Self> {
        let cache_file = settings.dirs.cache_file();
        let freshness = CacheFreshness::check(&cache_file, settings.ttl);
        let last_refreshed = std::fs::metadata(&cache_file)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from);

        let local_file = settings.dirs.local_file();
        let local = LocalOverrideConfig::load(&local_file, &settings.local_keys)?;
        let local_overrides = local
            .keys()
            .iter()
            .filter_map(|k| local.get(k).map(|v| (k.clone(), v.to_string())))
            .collect();

        Ok(Self {
            command: settings.command.clone(),
            binary: resolver.resolve(&settings.command).ok(),
            remote_url: settings.remote_url.clone(),
            cache_file,
            cache_state: freshness.label(),
            cache_age_secs: freshness.age().map(|a| a.as_secs()),
            last_refreshed,
            ttl_secs: settings.ttl.as_secs(),
            loader: settings.loader.kind().as_str(),
            local_file,
            local_overrides,
        })
    }

    /// Render the report as `key: value` lines.
    pub fn show(&self, ui: &mut dyn UserInterface) {
        ui.show_header(&format!("{} wrapper", self.command));

        match &self.binary {
            Some(path) => ui.field("Binary", &path.display().to_string()),
            None => ui.field("Binary", "not found"),
        }
        ui.field("Remote", self.remote_url.as_deref().unwrap_or("not configured"));
        ui.field("Cache", &self.cache_file.display().to_string());

        let state = match (self.cache_age_secs, &self.last_refreshed) {
            (Some(age), Some(at)) => format!(
                "{} ({} old, fetched {})",
                self.cache_state,
                format_duration(std::time::Duration::from_secs(age)),
                at.format("%Y-%m-%d %H:%M:%S")
            ),
            _ => self.cache_state.to_string(),
        };
        ui.field("State", &state);
        ui.field(
            "TTL",
            &format_duration(std::time::Duration::from_secs(self.ttl_secs)),
        );
        ui.field("Loader", self.loader);

        if self.local_overrides.is_empty() {
            ui.field("Local", "none");
        } else {
            for (key, value) in &self.local_overrides {
                ui.field(key, value);
            }
        }
    }
}

/// The status command implementation.
pub struct StatusCommand {
    env: RuntimeEnv,
    args: StatusArgs,
}

impl StatusCommand {
    pub fn new(env: &RuntimeEnv, args: StatusArgs) -> Self {
        Self {
            env: env.clone(),
            args,
        }
    }

    fn report(&self) -> Result<StatusReport> {
        let settings = Settings::load(&self.args.command, &self.env)?;
        let resolver = BinaryResolver::new(self.env.search_path(), SelfIdentity::current()?);
        StatusReport::collect(&settings, &resolver)
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = self.report()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            println!("{json}");
        } else {
            report.show(ui);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{AppDirs, WrapperFile};
    use crate::resolver::search_path::test_support::create_fake_binary;
    use crate::resolver::SearchPath;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn settings(temp: &TempDir, remote: Option<&str>) -> Settings {
        let file = WrapperFile {
            remote_url: remote.map(str::to_string),
            ..Default::default()
        };
        let dirs = AppDirs::new(temp.path().join("config"), temp.path().join("cache"));
        Settings::from_parts("tool", dirs, &file, &RuntimeEnv::default()).unwrap()
    }

    fn resolver(temp: &TempDir) -> BinaryResolver {
        BinaryResolver::new(
            SearchPath::new(vec![temp.path().join("real")]),
            SelfIdentity::from_path(temp.path().join("envshim")),
        )
    }

    #[test]
    fn reports_missing_cache_and_binary() {
        let temp = TempDir::new().unwrap();
        let report = StatusReport::collect(&settings(&temp, None), &resolver(&temp)).unwrap();

        assert!(report.binary.is_none());
        assert_eq!(report.cache_state, "missing");
        assert!(report.cache_age_secs.is_none());
        assert_eq!(report.ttl_secs, 300);
        assert_eq!(report.loader, "shell");

        let mut ui = MockUI::new();
        report.show(&mut ui);
        assert_eq!(ui.field_value("Binary"), Some("not found"));
        assert_eq!(ui.field_value("Remote"), Some("not configured"));
        assert_eq!(ui.field_value("Local"), Some("none"));
    }

    #[test]
    fn reports_fresh_cache_and_overrides() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join("real/tool"));
        let settings = settings(&temp, Some("https://config.example.com/env.sh"));
        fs::create_dir_all(temp.path().join("cache")).unwrap();
        fs::write(settings.dirs.cache_file(), "A=1\n").unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        fs::write(settings.dirs.local_file(), "OP_ITEM=\"op://Vault/item\"\n").unwrap();

        let report = StatusReport::collect(&settings, &resolver(&temp)).unwrap();

        assert_eq!(report.binary, Some(temp.path().join("real/tool")));
        assert_eq!(report.cache_state, "fresh");
        assert!(report.last_refreshed.is_some());
        assert_eq!(
            report.local_overrides.get("OP_ITEM").map(String::as_str),
            Some("op://Vault/item")
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cache_state"], "fresh");
        assert_eq!(json["remote_url"], "https://config.example.com/env.sh");
    }
}
