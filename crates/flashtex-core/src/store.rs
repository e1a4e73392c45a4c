//! Reading and atomically replacing deck files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{DeckError, DeckResult};

/// Read a deck file as UTF-8.
pub fn read_source(path: &Path) -> DeckResult<String> {
    std::fs::read_to_string(path).map_err(|e| DeckError::persistence(path, e))
}

/// Replace the contents of `path` with `content`.
///
/// The new content is written to a temporary file in the same directory,
/// synced, then renamed over the target. Either the whole new content lands
/// or the old file is left as it was.
pub fn write_atomic(path: &Path, content: &str) -> DeckResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DeckError::persistence(path, e))?;
    tmp.write_all(content.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| DeckError::persistence(path, e))?;

    if let Ok(meta) = std::fs::metadata(path) {
        // keep the original permissions; the temp file is created 0600
        if let Err(e) = std::fs::set_permissions(tmp.path(), meta.permissions()) {
            tracing::warn!("could not keep permissions of {}: {e}", path.display());
        }
    }

    tmp.persist(path)
        .map_err(|e| DeckError::persistence(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_cards.tex");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, "new content\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), "new content\n");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn keeps_permissions_of_replaced_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared_cards.tex");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&path, "new").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("a_cards.tex");
        let err = write_atomic(&path, "x").unwrap_err();
        assert!(matches!(err, DeckError::Persistence { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn read_missing_file_names_the_path() {
        let err = read_source(Path::new("/definitely/not/here_cards.tex")).unwrap_err();
        assert!(err.to_string().contains("here_cards.tex"));
    }
}
