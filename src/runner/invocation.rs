//! One wrapper invocation, from resolution to launch.

use std::ffi::OsString;
use std::path::Path;

use crate::cache::{CacheStatus, ConfigCache};
use crate::config::{LocalOverrideConfig, RuntimeEnv, Settings};
use crate::environment::{ChildEnv, EnvLayerStack};
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::launch::Launch;
use crate::resolver::{BinaryResolver, SelfIdentity};

/// A single run of a wrapped command.
#[derive(Debug, Clone)]
pub struct Invocation {
    settings: Settings,
    env: RuntimeEnv,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(settings: Settings, env: RuntimeEnv, args: Vec<OsString>) -> Self {
        Self {
            settings,
            env,
            args,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve the real binary, refresh the cache and compose the child
    /// environment.
    ///
    /// The resolver runs first so a missing binary fails before any network
    /// access.
    pub fn prepare<F: Fetcher>(&self, resolver: &BinaryResolver, fetcher: F) -> Result<Launch> {
        let program = resolver.resolve(&self.settings.command)?;

        let cache = ConfigCache::new(
            self.settings.dirs.cache_file(),
            self.settings.require_remote_url()?,
            self.settings.ttl,
            fetcher,
        );
        if let CacheStatus::Refreshed { bytes } = cache.ensure_fresh()? {
            tracing::debug!("Refreshed {} ({} bytes)", cache.path().display(), bytes);
        }

        let env = self.compose_env(cache.path())?;
        Ok(Launch::new(program, self.args.clone(), env))
    }

    /// Prepare and hand over to the real binary.
    pub fn run<F: Fetcher>(self, resolver: &BinaryResolver, fetcher: F) -> Result<u8> {
        self.prepare(resolver, fetcher)?.run()
    }

    fn compose_env(&self, remote_script: &Path) -> Result<ChildEnv> {
        let loader = &self.settings.loader;
        let local = LocalOverrideConfig::load(
            &self.settings.dirs.local_file(),
            &self.settings.local_keys,
        )?;

        // The remote script runs with local overrides visible (it may read
        // OP_ITEM), but its results still rank below them.
        let mut visible = EnvLayerStack::new();
        if !local.is_empty() {
            visible.push(local.to_layer());
        }
        let remote = loader.load(remote_script, &self.base_env(&visible), "remote")?;

        let mut stack = EnvLayerStack::new();
        stack.push(remote);
        if !local.is_empty() {
            stack.push(local.to_layer());
        }

        let middleware = self.settings.dirs.middleware_file();
        if middleware.is_file() {
            let layer = loader.load(&middleware, &self.base_env(&stack), "middleware")?;
            stack.push(layer);
        }

        for key in stack.resolve().keys() {
            let source = stack.source_of(key).unwrap_or("unknown");
            if self.env.var_os(key).is_some() {
                tracing::debug!("{} kept from environment (overrides {})", key, source);
            } else {
                tracing::debug!("{} from {}", key, source);
            }
        }
        Ok(self.base_env(&stack))
    }

    /// The layers so far under the inherited environment.
    fn base_env(&self, stack: &EnvLayerStack) -> ChildEnv {
        ChildEnv::compose(stack, self.env.to_pairs())
    }
}

/// Run `command` as a wrapper with production resolver and fetcher.
pub fn run_wrapper(command: &str, args: Vec<OsString>, env: RuntimeEnv) -> Result<u8> {
    let settings = Settings::load(command, &env)?;
    let resolver = BinaryResolver::new(env.search_path(), SelfIdentity::current()?);
    let fetcher = HttpFetcher::new(settings.fetch)?;

    Invocation::new(settings, env, args).run(&resolver, fetcher)
}
