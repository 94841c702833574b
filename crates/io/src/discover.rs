// Input report discovery

use std::fs;
use std::path::Path;

use labmerge_recon::SourceFile;

/// Regular files directly inside `dir` whose extension is one of `extensions`
/// (compared case-insensitively), sorted by file name.
///
/// Each file's id is its path; its display name is the file stem.
pub fn discover_inputs(dir: &Path, extensions: &[String]) -> Result<Vec<SourceFile>, String> {
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("cannot read directory {}: {}", dir.display(), e))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("cannot read directory {}: {}", dir.display(), e))?;
        let path = entry.path();

        // Follows symlinks, so a link to a report counts as a report
        if !path.is_file() {
            continue;
        }
        if !has_extension(&path, extensions) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        found.push((name, SourceFile::new(path.display().to_string(), stem)));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    log::info!("found {} input file(s) in {}", found.len(), dir.display());
    Ok(found.into_iter().map(|(_, source)| source).collect())
}

/// Leading dots in `extensions` are ignored, so `"txt"` and `".txt"` both work.
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
