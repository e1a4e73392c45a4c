//! `flashtex.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::discovery::DEFAULT_SUFFIX;

/// Overrides `deck_dir` when set.
pub const DECK_DIR_ENV: &str = "FLASHTEX_DECK_DIR";

/// Top-level flashtex configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashtexConfig {
    /// Directory holding the deck files.
    #[serde(default = "default_deck_dir")]
    pub deck_dir: PathBuf,
    /// Deck files are the files whose name ends with this.
    #[serde(default = "default_suffix")]
    pub file_suffix: String,
    /// Also search subdirectories of `deck_dir`.
    #[serde(default)]
    pub recursive: bool,
}

fn default_deck_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

impl Default for FlashtexConfig {
    fn default() -> Self {
        Self {
            deck_dir: default_deck_dir(),
            file_suffix: default_suffix(),
            recursive: false,
        }
    }
}

impl FlashtexConfig {
    fn validate(&self) -> Result<()> {
        if self.file_suffix.trim().is_empty() {
            anyhow::bail!("file_suffix must not be empty");
        }
        Ok(())
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order when no path is given:
/// 1. `flashtex.toml` in the current directory
/// 2. `~/.config/flashtex/config.toml`
///
/// Without a file the defaults apply. `FLASHTEX_DECK_DIR` overrides
/// `deck_dir` either way.
pub fn load_config_from(path: Option<&Path>) -> Result<FlashtexConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("flashtex.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<FlashtexConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => FlashtexConfig::default(),
    };

    if let Some(dir) = std::env::var_os(DECK_DIR_ENV).filter(|v| !v.is_empty()) {
        config.deck_dir = PathBuf::from(dir);
    }

    config.validate()?;
    match &config_path {
        Some(path) => tracing::debug!("loaded config from {}", path.display()),
        None => tracing::debug!("no config file found, using defaults"),
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("flashtex"))
}
