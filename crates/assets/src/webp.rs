use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::{AssetError, Result};
use crate::walk::{collect_files, has_extension};

/// Raster formats that get a `.webp` sibling. Must stay in sync with what
/// `media::source` is willing to derive.
pub const RASTER_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebpReport {
    pub converted: Vec<PathBuf>,
    pub already_present: usize,
    pub failed: usize,
}

pub fn webp_sibling(path: &Path) -> PathBuf {
    path.with_extension("webp")
}

/// Encodes one image as lossless WebP next to the original. GIFs contribute
/// their first frame.
pub fn encode_webp(path: &Path) -> Result<PathBuf> {
    let target = webp_sibling(path);
    let img = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    img.to_rgba8()
        .save_with_format(&target, ImageFormat::WebP)
        .map_err(|source| AssetError::Image {
            path: target.clone(),
            source,
        })?;
    Ok(target)
}

/// Walks `dirs` and generates missing `.webp` siblings. Directories that do
/// not exist are skipped; per-file failures are logged and counted.
pub fn generate_webp_siblings(dirs: &[PathBuf]) -> Result<WebpReport> {
    let mut report = WebpReport::default();

    for dir in dirs {
        if !dir.is_dir() {
            log::debug!(target: "assets.webp", "skipping missing dir {}", dir.display());
            continue;
        }

        for path in collect_files(dir)? {
            if !has_extension(&path, &RASTER_EXTENSIONS) {
                continue;
            }
            if webp_sibling(&path).exists() {
                report.already_present += 1;
                continue;
            }

            match encode_webp(&path) {
                Ok(target) => {
                    log::info!(target: "assets.webp", "{} -> {}", path.display(), target.display());
                    report.converted.push(target);
                }
                Err(err) => {
                    log::error!(target: "assets.webp", "{err}");
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}
