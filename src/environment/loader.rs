//! Turning an environment script into an [`EnvLayer`].

use super::{ChildEnv, EnvFileParser, EnvLayer};
use crate::error::{Result, ShimError};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Default interpreter for the `shell` loader.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Sources `$1` with auto-export on, keeps its stdout off our pipe, then dumps
/// the resulting environment NUL-separated.
const SOURCE_AND_DUMP: &str = r#"set -a; . "$1" 1>&2; exec env -0"#;

/// Variables the shell maintains itself.
const SHELL_MANAGED: &[&str] = &["PWD", "OLDPWD", "SHLVL", "_"];

/// How an environment script is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    /// Execute the script in a shell and capture what it exports.
    #[default]
    Shell,
    /// Parse `KEY=value` lines without executing anything.
    Assignments,
}

impl LoaderKind {
    /// Name as written in `wrapper.yml`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Assignments => "assignments",
        }
    }
}

/// Loads environment scripts with a chosen [`LoaderKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLoader {
    kind: LoaderKind,
    shell: PathBuf,
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new(LoaderKind::default(), DEFAULT_SHELL)
    }
}

impl ScriptLoader {
    pub fn new(kind: LoaderKind, shell: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            shell: shell.into(),
        }
    }

    pub fn kind(&self) -> LoaderKind {
        self.kind
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    /// Load `script` into a layer named `source`.
    ///
    /// For the shell loader, `base` is the exact environment the script runs
    /// in; only variables it adds or changes end up in the layer.
    pub fn load(&self, script: &Path, base: &ChildEnv, source: &str) -> Result<EnvLayer> {
        let layer = match self.kind {
            LoaderKind::Assignments => {
                let vars =
                    EnvFileParser::load(script).map_err(|e| ShimError::EnvLoadFailed {
                        path: script.to_path_buf(),
                        message: format!("{e:#}"),
                    })?;
                EnvLayer::from_vars(source, vars)
            }
            LoaderKind::Shell => self.source_in_shell(script, base, source)?,
        };

        tracing::debug!(
            script = %script.display(),
            loader = self.kind.as_str(),
            vars = layer.len(),
            "Loaded {} layer",
            source
        );
        Ok(layer)
    }

    fn source_in_shell(&self, script: &Path, base: &ChildEnv, source: &str) -> Result<EnvLayer> {
        let load_failed = |message: String| ShimError::EnvLoadFailed {
            path: script.to_path_buf(),
            message,
        };

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(SOURCE_AND_DUMP)
            .arg("envshim")
            .arg(script)
            .env_clear()
            .envs(base.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| load_failed(format!("cannot run {}: {e}", self.shell.display())))?;

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map(|c| format!("exit code {c}"))
                .unwrap_or_else(|| "killed by signal".to_string());
            return Err(load_failed(format!("script failed ({status})")));
        }

        let mut layer = EnvLayer::new(source);
        for (key, value) in parse_env_dump(&output.stdout) {
            if SHELL_MANAGED.contains(&key) {
                continue;
            }
            if base.get(key).map(OsStr::as_encoded_bytes) == Some(value.as_bytes()) {
                continue;
            }
            layer.set(key, value);
        }
        Ok(layer)
    }
}

/// Split `env -0` output into name/value pairs, skipping entries that are not
/// valid UTF-8 or have no `=`.
fn parse_env_dump(raw: &[u8]) -> impl Iterator<Item = (&str, &str)> {
    raw.split(|b| *b == 0)
        .filter_map(|entry| std::str::from_utf8(entry).ok())
        .filter_map(|entry| entry.split_once('='))
        .filter(|(key, _)| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvLayerStack;
    use std::fs;
    use tempfile::TempDir;

    fn write_script(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("env-remote.sh");
        fs::write(&path, content).unwrap();
        path
    }

    fn base_env(vars: &[(&str, &str)]) -> ChildEnv {
        let mut inherited: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(path) = std::env::var_os("PATH") {
            inherited.push(("PATH".into(), path.to_string_lossy().into_owned()));
        }
        ChildEnv::compose(&EnvLayerStack::new(), inherited)
    }

    #[test]
    fn loader_kind_deserializes_lowercase() {
        let kind: LoaderKind = serde_yaml::from_str("assignments").unwrap();
        assert_eq!(kind, LoaderKind::Assignments);
        let kind: LoaderKind = serde_yaml::from_str("shell").unwrap();
        assert_eq!(kind, LoaderKind::Shell);
        assert!(serde_yaml::from_str::<LoaderKind>("python").is_err());
    }

    #[test]
    fn assignments_loader_parses_without_executing() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("ran");
        let script = write_script(
            &temp,
            &format!(
                "touch {}\nexport BASE_URL=\"https://llm.example.com\"\n",
                marker.display()
            ),
        );

        let loader = ScriptLoader::new(LoaderKind::Assignments, DEFAULT_SHELL);
        let layer = loader.load(&script, &ChildEnv::default(), "remote").unwrap();

        assert_eq!(layer.source, "remote");
        assert_eq!(
            layer.vars.get("BASE_URL").map(String::as_str),
            Some("https://llm.example.com")
        );
        assert!(!marker.exists());
    }

    #[test]
    fn assignments_loader_reports_missing_file() {
        let loader = ScriptLoader::new(LoaderKind::Assignments, DEFAULT_SHELL);
        let err = loader
            .load(Path::new("/nonexistent/env.sh"), &ChildEnv::default(), "remote")
            .unwrap_err();
        assert!(matches!(err, ShimError::EnvLoadFailed { .. }));
    }

    #[test]
    fn parse_env_dump_splits_on_nul() {
        let raw = b"A=1\0B=x=y\0MULTI=line1\nline2\0junk\0";
        let pairs: Vec<_> = parse_env_dump(raw).collect();
        assert_eq!(
            pairs,
            vec![("A", "1"), ("B", "x=y"), ("MULTI", "line1\nline2")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn shell_loader_captures_new_and_changed_variables() {
        let temp = TempDir::new().unwrap();
        let script = write_script(
            &temp,
            "BASE_URL=https://llm.example.com\nMODEL=\"$DEFAULT_MODEL-v2\"\nKEEP=same\necho noise\n",
        );

        let base = base_env(&[("DEFAULT_MODEL", "large"), ("KEEP", "same")]);
        let layer = ScriptLoader::default().load(&script, &base, "remote").unwrap();

        assert_eq!(
            layer.vars.get("BASE_URL").map(String::as_str),
            Some("https://llm.example.com")
        );
        assert_eq!(layer.vars.get("MODEL").map(String::as_str), Some("large-v2"));
        assert!(!layer.contains("KEEP"));
        assert!(!layer.contains("DEFAULT_MODEL"));
        assert!(!layer.contains("PWD"));
        assert!(!layer.contains("SHLVL"));
    }

    #[cfg(unix)]
    #[test]
    fn shell_loader_reports_failing_script() {
        let temp = TempDir::new().unwrap();
        let script = write_script(&temp, "exit 3\n");

        let err = ScriptLoader::default()
            .load(&script, &base_env(&[]), "remote")
            .unwrap_err();
        match err {
            ShimError::EnvLoadFailed { message, .. } => assert!(message.contains("exit code 3")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_shell_is_a_load_failure() {
        let temp = TempDir::new().unwrap();
        let script = write_script(&temp, "A=1\n");

        let loader = ScriptLoader::new(LoaderKind::Shell, "/nonexistent/shell");
        let err = loader.load(&script, &base_env(&[]), "remote").unwrap_err();
        assert!(matches!(err, ShimError::EnvLoadFailed { .. }));
    }
}
