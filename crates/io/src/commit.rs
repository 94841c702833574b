// Write-then-rename output commit

use std::fs;
use std::path::{Path, PathBuf};

use crate::PARTIAL_SUFFIX;

/// Sibling path a writer fills before the final rename: `report.csv` -> `report.csv.partial`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

/// Run `write` against the partial path, then rename it onto `path`.
///
/// On any failure the partial file is removed and `path` is left untouched,
/// so a reader never sees a half-written report.
pub fn commit_with<F>(path: &Path, write: F) -> Result<(), String>
where
    F: FnOnce(&Path) -> Result<(), String>,
{
    let part = partial_path(path);

    if let Err(e) = write(&part) {
        let _ = fs::remove_file(&part);
        return Err(format!("{}: {}", path.display(), e));
    }

    fs::rename(&part, path).map_err(|e| {
        let _ = fs::remove_file(&part);
        format!("rename {} → {}: {}", part.display(), path.display(), e)
    })?;

    log::debug!("wrote {}", path.display());
    Ok(())
}
