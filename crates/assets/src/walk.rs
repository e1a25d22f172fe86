use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, Result};

/// Every regular file under `dir`, depth first, sorted per directory.
/// `min/` directories and `*.min.*` files are outputs of earlier runs and are
/// skipped.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AssetError::MissingDir(dir.to_path_buf()));
    }
    let mut out = Vec::new();
    walk(dir, &mut out)?;
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(AssetError::io(dir))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(AssetError::io(dir))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == "min" || name.contains(".min.") {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type().map_err(AssetError::io(&path))?;
        if file_type.is_dir() {
            walk(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(AssetError::io(dir))
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|c| ext.eq_ignore_ascii_case(c)))
}
