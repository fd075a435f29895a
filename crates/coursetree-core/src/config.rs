//! Settings loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level coursetree settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Documentation languages in order of preference.
    #[serde(default = "default_languages")]
    pub language_priorities: Vec<String>,
    /// Directory containing the root `metadata.toml`.
    #[serde(default = "default_repository_root")]
    pub repository_root: PathBuf,
    /// File in which judgments are cached between runs.
    #[serde(default = "default_judgment_cache")]
    pub judgment_cache: PathBuf,
    /// Seconds to wait after a judgment change before writing the cache.
    #[serde(default = "default_cache_delay")]
    pub cache_delay: f64,
    /// Test runner invoked by pytest judges.
    #[serde(default = "default_judge_program")]
    pub judge_program: String,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string(), "nl".to_string()]
}
fn default_repository_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_judgment_cache() -> PathBuf {
    config_dir()
        .map(|dir| dir.join("judgment-cache.json"))
        .unwrap_or_else(|| PathBuf::from("judgment-cache.json"))
}
fn default_cache_delay() -> f64 {
    5.0
}
fn default_judge_program() -> String {
    "pytest".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language_priorities: default_languages(),
            repository_root: default_repository_root(),
            judgment_cache: default_judgment_cache(),
            cache_delay: default_cache_delay(),
            judge_program: default_judge_program(),
        }
    }
}

impl Settings {
    /// Cache write delay as a `Duration`.
    pub fn cache_delay(&self) -> Duration {
        Duration::from_secs_f64(self.cache_delay)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.cache_delay.is_finite() && self.cache_delay >= 0.0,
            "cache_delay must be a non-negative number of seconds, got {}",
            self.cache_delay
        );
        anyhow::ensure!(
            !self.language_priorities.is_empty(),
            "language_priorities must list at least one language"
        );
        anyhow::ensure!(
            !self.judge_program.trim().is_empty(),
            "judge_program must not be empty"
        );
        Ok(())
    }
}

/// Parse settings from a TOML string and validate them.
pub fn parse_settings(content: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(content).context("failed to parse settings")?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from well-known paths.
///
/// Search order:
/// 1. `coursetree.toml` in the current directory
/// 2. `~/.config/coursetree/config.toml`
///
/// Environment variable override: `COURSETREE_REPOSITORY_ROOT`.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(None)
}

/// Load settings from an explicit path, or search the default locations.
pub fn load_settings_from(path: Option<&Path>) -> Result<Settings> {
    let settings_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("settings file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("coursetree.toml");
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut settings = match settings_path {
        Some(path) => {
            tracing::debug!("loading settings from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            parse_settings(&content)
                .with_context(|| format!("invalid settings file: {}", path.display()))?
        }
        None => {
            tracing::debug!("no settings file found, using defaults");
            Settings::default()
        }
    };

    if let Ok(root) = std::env::var("COURSETREE_REPOSITORY_ROOT") {
        settings.repository_root = PathBuf::from(root);
    }

    Ok(settings)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("coursetree"))
}
