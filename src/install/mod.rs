//! One-time setup of a wrapped command.
//!
//! Installing `<cmd>`:
//!
//! 1. Checks the real binary resolves and warns about a missing `op` CLI
//! 2. Creates the bin, config and cache directories
//! 3. Persists the remote URL into `wrapper.yml`
//! 4. Links `<bin-dir>/<cmd>` to envshim
//! 5. Puts the bin directory on `PATH` via the shell profile
//! 6. Pre-fetches the remote configuration
//! 7. Asks for the local overrides and writes `local.env`

pub mod profile;
pub mod shim;

pub use profile::{detect_profile, ensure_on_path, PathUpdate, ShellType};
pub use shim::{backup_path, place_shim, ShimPlacement};

use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{create_private_dir, CacheStatus, ConfigCache};
use crate::config::{LocalOverrideConfig, RuntimeEnv, Settings, WrapperFile};
use crate::error::{Result, ShimError};
use crate::fetch::Fetcher;
use crate::resolver::BinaryResolver;
use crate::ui::{Prompt, UserInterface};

/// Attempts per prompt before giving up.
const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Secret manager CLI that resolves `op://` references.
const SECRET_CLI: &str = "op";

/// Options for [`install`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub command: String,
    pub remote_url: Option<String>,
    pub endpoint: Option<String>,
    pub secret_ref: Option<String>,
    /// Defaults to `~/.local/bin`.
    pub bin_dir: Option<PathBuf>,
    pub force: bool,
    pub modify_path: bool,
    pub interactive: bool,
}

/// What [`install`] did.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub real_binary: PathBuf,
    pub shim: PathBuf,
    pub placement: ShimPlacement,
    /// `None` when PATH changes were disabled.
    pub path_update: Option<PathUpdate>,
    pub prefetched: bool,
    pub local_file: PathBuf,
}

/// Install the wrapper for `options.command`.
///
/// `exe` is the envshim executable the shim will point at.
pub fn install<F: Fetcher>(
    options: &InstallOptions,
    env: &RuntimeEnv,
    resolver: &BinaryResolver,
    fetcher: F,
    exe: &Path,
    ui: &mut dyn UserInterface,
) -> Result<InstallReport> {
    let command = options.command.as_str();
    ui.show_header(&format!("Installing {command} wrapper"));

    let mut settings = Settings::load(command, env)?;
    let mut wrapper_file = WrapperFile::load_optional(&settings.dirs.wrapper_file())?;
    if let Some(url) = &options.remote_url {
        wrapper_file.remote_url = Some(url.clone());
        settings.remote_url = Some(url.clone());
    }
    let remote_url = settings.require_remote_url()?.to_string();

    // 1. Prerequisites
    let real_binary = resolver.resolve(command)?;
    ui.field("Real", &real_binary.display().to_string());
    if settings.secret_ref_prefix == "op://"
        && resolver.search_path().candidates(SECRET_CLI).is_empty()
    {
        ui.warning(&format!(
            "{SECRET_CLI} CLI not found; {} references will not resolve",
            settings.secret_ref_prefix
        ));
    }

    // 2. Directories
    let bin_dir = match &options.bin_dir {
        Some(dir) => dir.clone(),
        None => default_bin_dir(env)?,
    };
    create_public_dir(&bin_dir)?;
    fs::create_dir_all(settings.dirs.config_dir())?;
    create_private_dir(settings.dirs.cache_dir())?;

    // 3. Settings file
    wrapper_file.save(&settings.dirs.wrapper_file())?;
    ui.success(&format!("Wrote {}", settings.dirs.wrapper_file().display()));

    // 4. Shim
    let shim = bin_dir.join(shim_file_name(command));
    let placement = place_shim(&shim, exe, &real_binary, options.force)?;
    match &placement {
        ShimPlacement::ReplacedSymlink { previous } => ui.message(&format!(
            "Replaced symlink {} -> {}",
            shim.display(),
            previous.display()
        )),
        ShimPlacement::BackedUp { backup } => {
            ui.message(&format!("Backed up existing file to {}", backup.display()))
        }
        ShimPlacement::Created | ShimPlacement::Overwritten => {}
    }
    ui.success(&format!("Linked {} -> {}", shim.display(), exe.display()));

    // 5. PATH
    let path_update = if options.modify_path {
        let home = env.home_dir().ok_or_else(|| ShimError::ConfigInvalid {
            message: "HOME is not set".to_string(),
        })?;
        let profile = detect_profile(env.var("SHELL"), &home);
        let update = ensure_on_path(&bin_dir, &env.search_path(), &profile)?;
        match &update {
            PathUpdate::Appended(profile) => {
                ui.success(&format!(
                    "Added {} to PATH in {}",
                    bin_dir.display(),
                    profile.display()
                ));
                ui.warning(&format!(
                    "Restart your shell or run: source {}",
                    profile.display()
                ));
            }
            PathUpdate::AlreadyOnPath | PathUpdate::AlreadyInProfile(_) => {
                ui.success(&format!("{} is already on PATH", bin_dir.display()))
            }
        }
        Some(update)
    } else {
        None
    };

    // 6. Pre-fetch
    let cache = ConfigCache::new(settings.dirs.cache_file(), &remote_url, settings.ttl, fetcher);
    let prefetched = match cache.refresh() {
        Ok(CacheStatus::StaleButPresent { reason }) => {
            ui.warning(&format!("Could not fetch remote configuration: {reason}"));
            false
        }
        Ok(_) => {
            ui.success("Remote configuration cached");
            true
        }
        Err(err) => {
            ui.warning(&format!("Could not fetch remote configuration: {err}"));
            ui.warning(&format!("The wrapper will retry on the next {command} launch"));
            false
        }
    };

    // 7. Local overrides
    let local_file = settings.dirs.local_file();
    let mut local = LocalOverrideConfig::load(&local_file, &settings.local_keys)?;
    let interactive = options.interactive && ui.is_interactive();
    collect_local_values(&mut local, options, &settings, interactive, ui)?;
    local.write(&local_file, command)?;
    ui.success(&format!("Wrote {}", local_file.display()));

    Ok(InstallReport {
        real_binary,
        shim,
        placement,
        path_update,
        prefetched,
        local_file,
    })
}

fn collect_local_values(
    local: &mut LocalOverrideConfig,
    options: &InstallOptions,
    settings: &Settings,
    interactive: bool,
    ui: &mut dyn UserInterface,
) -> Result<()> {
    if let Some(key) = local.endpoint_key().map(str::to_string) {
        let value = match &options.endpoint {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ if interactive => ask(ui, "endpoint", &format!("  {key}"), local.endpoint(), |v| {
                (!v.is_empty()).then_some(()).ok_or("Must not be empty")
            })?,
            _ => local
                .endpoint()
                .map(str::to_string)
                .ok_or_else(|| missing_value(&key, "--endpoint"))?,
        };
        local.set(&key, value);
    }

    if let Some(key) = local.secret_ref_key().map(str::to_string) {
        let prefix = settings.secret_ref_prefix.as_str();
        let check = |v: &str| {
            v.starts_with(prefix)
                .then_some(())
                .ok_or("Must start with the secret reference prefix")
        };
        let value = match &options.secret_ref {
            Some(value) => {
                check(value.as_str()).map_err(|_| ShimError::ConfigInvalid {
                    message: format!("secret reference must start with {prefix}"),
                })?;
                value.clone()
            }
            None if interactive => ask(
                ui,
                "secret_ref",
                &format!("  {key} ({prefix}...)"),
                local.secret_ref(),
                check,
            )?,
            None => local
                .secret_ref()
                .map(str::to_string)
                .ok_or_else(|| missing_value(&key, "--secret-ref"))?,
        };
        local.set(&key, value);
    }

    Ok(())
}

/// Prompt until `validate` accepts the answer.
fn ask(
    ui: &mut dyn UserInterface,
    key: &str,
    question: &str,
    default: Option<&str>,
    validate: impl Fn(&str) -> std::result::Result<(), &'static str>,
) -> Result<String> {
    let prompt = Prompt::new(key, question).with_default(default);
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let answer = ui.prompt(&prompt)?;
        match validate(&answer) {
            Ok(()) => return Ok(answer),
            Err(reason) => ui.warning(&format!("{reason}; try again")),
        }
    }
    Err(ShimError::ConfigInvalid {
        message: format!("no valid value for {key} after {MAX_PROMPT_ATTEMPTS} attempts"),
    })
}

fn missing_value(key: &str, flag: &str) -> ShimError {
    ShimError::ConfigInvalid {
        message: format!("{key} is not set; pass {flag} or run interactively"),
    }
}

fn default_bin_dir(env: &RuntimeEnv) -> Result<PathBuf> {
    env.home_dir()
        .map(|home| home.join(".local").join("bin"))
        .ok_or_else(|| ShimError::ConfigInvalid {
            message: "HOME is not set; pass --bin-dir".to_string(),
        })
}

fn shim_file_name(command: &str) -> String {
    if cfg!(windows) {
        format!("{command}.exe")
    } else {
        command.to_string()
    }
}

fn create_public_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}
