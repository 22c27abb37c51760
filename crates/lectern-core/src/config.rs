use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::view::export::ExportFormat;

/// Name of the per-project state directory.
pub const PROJECT_DIR: &str = ".lectern";

/// Per-project settings in `.lectern/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub default_format: ExportFormat,
    #[serde(default = "default_speech_heading")]
    pub speech_heading: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::default(),
            speech_heading: default_speech_heading(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

/// Per-user settings in `<config dir>/lectern/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    /// Email or id of the user to act as when `--as` and `LECTERN_USER` are unset.
    #[serde(default)]
    pub user: Option<String>,
}

#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join("config.toml")
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write the default project config, leaving an existing file alone.
///
/// Returns `true` when a file was written.
pub fn write_default_project_config(project_root: &Path) -> Result<bool> {
    let path = project_config_path(project_root);
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let body = toml::to_string_pretty(&ProjectConfig::default())
        .context("Failed to serialize default config")?;
    std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("lectern/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Output mode precedence: `--json`, then `FORMAT`, then user config, then TTY.
#[must_use]
pub fn resolve_output(cli_json: bool, user_output: Option<&str>) -> String {
    let env_format = env::var("FORMAT").ok();
    resolve_output_from(
        cli_json,
        user_output,
        env_format.as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn resolve_output_from(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty { "pretty" } else { "text" }.to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

fn default_speech_heading() -> String {
    "Sprechtexte".to_string()
}

const fn default_recent_limit() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("tempdir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.store.lock_timeout_ms, 2_000);
        assert_eq!(cfg.export.speech_heading, "Sprechtexte");
        assert_eq!(cfg.export.default_format, ExportFormat::Json);
        assert_eq!(cfg.dashboard.recent_limit, 5);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(root.path().join(PROJECT_DIR)).expect("mkdir");
        std::fs::write(
            project_config_path(root.path()),
            "[export]\nspeech_heading = \"Speaker notes\"\ndefault_format = \"text\"\n",
        )
        .expect("write");

        let cfg = load_project_config(root.path()).expect("load");
        assert_eq!(cfg.export.speech_heading, "Speaker notes");
        assert_eq!(cfg.export.default_format, ExportFormat::Text);
        assert_eq!(cfg.store, StoreConfig::default());
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(root.path().join(PROJECT_DIR)).expect("mkdir");
        std::fs::write(project_config_path(root.path()), "[store\n").expect("write");

        let err = load_project_config(root.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn default_config_round_trips_and_is_not_overwritten() {
        let root = tempfile::tempdir().expect("tempdir");
        assert!(write_default_project_config(root.path()).expect("write"));
        assert!(!write_default_project_config(root.path()).expect("second write"));
        let cfg = load_project_config(root.path()).expect("load");
        assert_eq!(cfg, ProjectConfig::default());
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output_from(true, Some("pretty"), Some("text"), true);
        assert_eq!(output, "json");
    }

    #[test]
    fn env_beats_user_config_and_tty_decides_last() {
        assert_eq!(resolve_output_from(false, Some("json"), Some("plain"), true), "text");
        assert_eq!(resolve_output_from(false, Some("json"), None, true), "json");
        assert_eq!(resolve_output_from(false, None, Some("bogus"), true), "pretty");
        assert_eq!(resolve_output_from(false, None, None, false), "text");
    }

    #[test]
    fn user_config_parses_identity() {
        let cfg: UserConfig =
            toml::from_str("output = \"json\"\nuser = \"admin@example.com\"\n").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.user.as_deref(), Some("admin@example.com"));
    }
}
