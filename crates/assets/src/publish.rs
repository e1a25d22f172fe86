use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, Result};
use crate::names::normalize_file_name;
use crate::walk::ensure_dir;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub copied: Vec<PathBuf>,
    pub missing: usize,
    pub failed: usize,
}

impl PublishReport {
    fn merge(&mut self, other: PublishReport) {
        self.copied.extend(other.copied);
        self.missing += other.missing;
        self.failed += other.failed;
    }
}

fn copy_one(from: &Path, to: PathBuf, report: &mut PublishReport) {
    match fs::copy(from, &to) {
        Ok(_) => {
            log::debug!(target: "assets.publish", "{} -> {}", from.display(), to.display());
            report.copied.push(to);
        }
        Err(err) => {
            log::error!(target: "assets.publish", "copying {}: {err}", from.display());
            report.failed += 1;
        }
    }
}

/// Copies the regular files directly inside `source_dir` into `dest_dir`
/// under their normalized names. Dot files and subdirectories are skipped.
pub fn publish_dir(source_dir: &Path, dest_dir: &Path) -> Result<PublishReport> {
    if !source_dir.is_dir() {
        return Err(AssetError::MissingDir(source_dir.to_path_buf()));
    }
    ensure_dir(dest_dir)?;

    let mut entries = fs::read_dir(source_dir)
        .map_err(AssetError::io(source_dir))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(AssetError::io(source_dir))?;
    entries.sort_by_key(|e| e.file_name());

    let mut report = PublishReport::default();
    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let path = entry.path();
        if name.starts_with('.') || !path.is_file() {
            continue;
        }
        copy_one(&path, dest_dir.join(normalize_file_name(&name)), &mut report);
    }

    log::info!(
        target: "assets.publish",
        "copied {} file(s) from {} to {}",
        report.copied.len(),
        source_dir.display(),
        dest_dir.display()
    );
    Ok(report)
}

/// Copies individual project files (favicons and the like) into the top of
/// `dest_dir`. A missing file is a warning, not a failure.
pub fn publish_files(files: &[PathBuf], dest_dir: &Path) -> Result<PublishReport> {
    let mut report = PublishReport::default();
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        if !file.is_file() {
            log::warn!(target: "assets.publish", "{} not found", file.display());
            report.missing += 1;
            continue;
        }
        ensure_dir(dest_dir)?;
        copy_one(file, dest_dir.join(name), &mut report);
    }
    Ok(report)
}

/// Publishes every existing source dir into `images_dir`, then the loose
/// project files into `public_dir`.
pub fn publish_all(
    source_dirs: &[PathBuf],
    root_files: &[PathBuf],
    public_dir: &Path,
    images_dir: &Path,
) -> Result<PublishReport> {
    let mut report = publish_files(root_files, public_dir)?;
    for dir in source_dirs {
        if !dir.is_dir() {
            log::warn!(target: "assets.publish", "source dir {} does not exist", dir.display());
            continue;
        }
        report.merge(publish_dir(dir, images_dir)?);
    }
    Ok(report)
}
