pub mod init;
pub mod list;
pub mod rate;
pub mod sections;
pub mod show;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use flashtex_core::config::{load_config_from, FlashtexConfig};
use flashtex_core::discovery::discover_deck_files;
use flashtex_core::{Deck, LoadReport};

/// Global flags that decide where the deck lives.
pub struct DeckArgs {
    pub config: Option<PathBuf>,
    pub dir: Option<PathBuf>,
}

impl DeckArgs {
    /// The effective config, with `--dir` applied.
    pub fn config(&self) -> Result<FlashtexConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(dir) = &self.dir {
            config.deck_dir = dir.clone();
        }
        Ok(config)
    }

    /// All deck files, sorted. Finding none is an error.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let config = self.config()?;
        let files = discover_deck_files(&config.deck_dir, &config.file_suffix, config.recursive)
            .with_context(|| format!("failed to scan deck directory {}", config.deck_dir.display()))?;
        if files.is_empty() {
            anyhow::bail!(
                "no deck files matching *{} in {}",
                config.file_suffix,
                config.deck_dir.display()
            );
        }
        Ok(files)
    }

    /// Load the whole deck. Problems in individual files are logged.
    pub fn load(&self) -> Result<LoadReport> {
        let files = self.files()?;
        let report = Deck::load(&files)?;
        Ok(report)
    }
}

/// `date`, or the local calendar date when not given.
pub fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Collapse whitespace and cut long payloads for table cells.
pub fn one_line(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
