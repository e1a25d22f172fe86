use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Result;
use crate::policy::HTML_EXTENSIONS;
use crate::walk::{collect_files, has_extension};

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImgTagReport {
    pub updated: Vec<PathBuf>,
    pub unchanged: usize,
    pub failed: usize,
}

/// Adds `loading="lazy"` and `decoding="async"` to `<img src=...>` tags that
/// lack them. Tags that already carry both `width` and `height` are left
/// alone.
pub fn add_img_attributes(html: &str) -> String {
    IMG_TAG
        .replace_all(html, |caps: &Captures<'_>| {
            let tag = &caps[0];
            let lower = tag.to_ascii_lowercase();
            if !lower.contains("src=") || (lower.contains("width=") && lower.contains("height=")) {
                return tag.to_string();
            }

            let mut extra = String::new();
            if !lower.contains("loading=") {
                extra.push_str(" loading=\"lazy\"");
            }
            if !lower.contains("decoding=") {
                extra.push_str(" decoding=\"async\"");
            }
            if extra.is_empty() {
                return tag.to_string();
            }

            let body = tag[..tag.len() - 1].trim_end();
            match body.strip_suffix('/') {
                Some(body) => format!("{}{extra} />", body.trim_end()),
                None => format!("{body}{extra}>"),
            }
        })
        .into_owned()
}

fn rewrite_file(path: &Path, report: &mut ImgTagReport) {
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(err) => {
            log::error!(target: "assets.img", "reading {}: {err}", path.display());
            report.failed += 1;
            return;
        }
    };
    let rewritten = add_img_attributes(&html);
    if rewritten == html {
        report.unchanged += 1;
        return;
    }
    match fs::write(path, rewritten) {
        Ok(()) => {
            log::info!(target: "assets.img", "updated img tags in {}", path.display());
            report.updated.push(path.to_path_buf());
        }
        Err(err) => {
            log::error!(target: "assets.img", "writing {}: {err}", path.display());
            report.failed += 1;
        }
    }
}

/// Rewrites every `.html` file under `dirs` in place. Files are only written
/// when a tag changed.
pub fn rewrite_img_tags(dirs: &[PathBuf]) -> Result<ImgTagReport> {
    let mut report = ImgTagReport::default();
    for dir in dirs {
        if !dir.is_dir() {
            log::debug!(target: "assets.img", "skipping missing dir {}", dir.display());
            continue;
        }
        for path in collect_files(dir)? {
            if has_extension(&path, &HTML_EXTENSIONS) {
                rewrite_file(&path, &mut report);
            }
        }
    }
    Ok(report)
}
