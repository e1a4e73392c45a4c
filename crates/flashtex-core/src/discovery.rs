//! Finding deck files on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default deck-file naming convention.
pub const DEFAULT_SUFFIX: &str = "_cards.tex";

/// Collect every file under `dir` whose name ends with `suffix`, sorted by
/// path. Subdirectories are only searched when `recursive` is set.
pub fn discover_deck_files(dir: &Path, suffix: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    collect(dir, suffix, recursive, &mut files)?;
    files.sort();
    tracing::debug!("found {} deck file(s) in {}", files.len(), dir.display());
    Ok(files)
}

fn collect(dir: &Path, suffix: &str, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if recursive {
                collect(&path, suffix, recursive, files)?;
            }
        } else if path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix) && name.len() > suffix.len())
        {
            files.push(path);
        }
    }
    Ok(())
}
