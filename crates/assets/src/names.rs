use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{AssetError, Result};
use crate::walk::ensure_dir;

/// Lowercase stem with every non-alphanumeric run collapsed to one `_`;
/// the extension is only lowercased.
///
/// `"My Photo (1).JPG"` becomes `"my_photo_1_.jpg"`.
pub fn normalize_file_name(name: &str) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], Some(&name[dot + 1..])),
        _ => (name, None),
    };

    let mut out = String::with_capacity(name.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    if let Some(ext) = ext {
        out.push('.');
        out.push_str(&ext.to_ascii_lowercase());
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenameReport {
    /// original file name -> normalized file name
    pub renamed: BTreeMap<String, String>,
    pub skipped: usize,
    pub failed: usize,
}

/// Copies every file in `source_dir` (not recursive) to its normalized name
/// next to the original, then publishes the renamed copies into
/// `target_dir`. Originals are never removed.
pub fn rename_images(source_dir: &Path, target_dir: &Path) -> Result<RenameReport> {
    if !source_dir.is_dir() {
        return Err(AssetError::MissingDir(source_dir.to_path_buf()));
    }
    log::info!(target: "assets.rename", "processing {}", source_dir.display());

    let mut report = RenameReport::default();
    let mut entries = fs::read_dir(source_dir)
        .map_err(AssetError::io(source_dir))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(AssetError::io(source_dir))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            log::warn!(target: "assets.rename", "skipping non-UTF-8 name {}", path.display());
            report.skipped += 1;
            continue;
        };

        let normalized = normalize_file_name(&name);
        if normalized == name {
            log::debug!(target: "assets.rename", "{name} already has a clean name");
            report.skipped += 1;
            continue;
        }

        match fs::copy(&path, source_dir.join(&normalized)) {
            Ok(_) => {
                log::info!(target: "assets.rename", "{name} -> {normalized}");
                report.renamed.insert(name, normalized);
            }
            Err(err) => {
                log::error!(target: "assets.rename", "renaming {name}: {err}");
                report.failed += 1;
            }
        }
    }

    if report.renamed.is_empty() {
        return Ok(report);
    }

    ensure_dir(target_dir)?;
    for new_name in report.renamed.values() {
        let from = source_dir.join(new_name);
        let to = target_dir.join(new_name);
        if let Err(err) = fs::copy(&from, &to) {
            log::error!(target: "assets.rename", "publishing {new_name}: {err}");
            report.failed += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_file_name("My Photo (1).JPG"), "my_photo_1_.jpg");
        assert_eq!(normalize_file_name("team--lead  shot.png"), "team_lead_shot.png");
        assert_eq!(normalize_file_name("logo.svg"), "logo.svg");
        assert_eq!(normalize_file_name("README"), "readme");
        assert_eq!(normalize_file_name(".hidden"), "_hidden");
        assert_eq!(normalize_file_name("Café.png"), "caf_.png");
    }

    #[test]
    fn copies_to_clean_names_and_publishes() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("attached_assets");
        let dst = tmp.path().join("public/images");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Office Front.JPG"), b"jpg").unwrap();
        fs::write(src.join("clean.png"), b"png").unwrap();

        let report = rename_images(&src, &dst).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(
            report.renamed.get("Office Front.JPG").map(String::as_str),
            Some("office_front.jpg")
        );
        assert!(src.join("Office Front.JPG").exists());
        assert!(src.join("office_front.jpg").exists());
        assert_eq!(fs::read(dst.join("office_front.jpg")).unwrap(), b"jpg");
        assert!(!dst.join("clean.png").exists());
    }
}
