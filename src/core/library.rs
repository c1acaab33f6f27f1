use std::path::{Path, PathBuf};

use super::metadata::SUPPORTED_EXTENSIONS;

/// Recursively collect files with a supported extension under `root`.
///
/// A root that is itself a file is returned as-is, whatever its extension,
/// so callers can report it as unsupported instead of silently skipping it.
pub fn scan_audio_files(root: &Path) -> Result<Vec<PathBuf>, String> {
    if !root.is_dir() {
        if !root.exists() {
            return Err(format!("{}: no such file or directory", root.display()));
        }
        return Ok(vec![root.to_path_buf()]);
    }

    let mut out = Vec::new();
    walk_dir(root, &mut out)?;
    Ok(out)
}

fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), String> {
    let entries = std::fs::read_dir(dir).map_err(|e| format!("{dir:?}: {e}"))?;

    for entry in entries {
        let entry = entry.map_err(|e| e.to_string())?;
        let path = entry.path();

        if path.is_dir() {
            walk_dir(&path, out)?;
        } else if is_supported(&path) {
            out.push(path);
        }
    }

    Ok(())
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
