mod css;
mod js;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, Result};
use crate::walk::{collect_files, ensure_dir, has_extension};

pub use css::minify_css;
pub use js::minify_js;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Css,
    Js,
}

impl SourceKind {
    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Css => "css",
            SourceKind::Js => "js",
        }
    }

    pub fn minify(self, src: &str) -> String {
        match self {
            SourceKind::Css => minify_css(src),
            SourceKind::Js => minify_js(src),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinifyReport {
    pub written: Vec<PathBuf>,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub failed: usize,
}

/// `dir/a/b.css` -> `out_dir/a/b.min.css`
pub fn min_output_path(input: &Path, dir: &Path, out_dir: &Path) -> PathBuf {
    let rel = input.strip_prefix(dir).unwrap_or(input);
    let stem = rel.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match rel.extension() {
        Some(ext) => format!("{stem}.min.{}", ext.to_string_lossy()),
        None => format!("{stem}.min"),
    };
    match rel.parent() {
        Some(parent) => out_dir.join(parent).join(name),
        None => out_dir.join(name),
    }
}

/// Minifies every source of `kind` under `dir` into a mirrored tree under
/// `out_dir`. `out_dir` may live inside `dir` (e.g. `css/min`); previous
/// outputs are never re-minified.
pub fn minify_tree(dir: &Path, out_dir: &Path, kind: SourceKind) -> Result<MinifyReport> {
    let mut report = MinifyReport::default();
    let inputs: Vec<PathBuf> = collect_files(dir)?
        .into_iter()
        .filter(|p| has_extension(p, &[kind.extension()]))
        .filter(|p| !p.starts_with(out_dir))
        .collect();

    if inputs.is_empty() {
        log::info!(target: "assets.minify", "no {} files under {}", kind.extension(), dir.display());
        return Ok(report);
    }

    for input in inputs {
        let output = min_output_path(&input, dir, out_dir);
        match minify_file(&input, &output, kind) {
            Ok((bytes_in, bytes_out)) => {
                log::info!(
                    target: "assets.minify",
                    "{} -> {} ({bytes_in} -> {bytes_out} bytes)",
                    input.display(),
                    output.display()
                );
                report.bytes_in += bytes_in;
                report.bytes_out += bytes_out;
                report.written.push(output);
            }
            Err(err) => {
                log::error!(target: "assets.minify", "{err}");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

fn minify_file(input: &Path, output: &Path, kind: SourceKind) -> Result<(u64, u64)> {
    let src = fs::read_to_string(input).map_err(AssetError::io(input))?;
    let min = kind.minify(&src);
    if let Some(parent) = output.parent() {
        ensure_dir(parent)?;
    }
    fs::write(output, &min).map_err(AssetError::io(output))?;
    Ok((src.len() as u64, min.len() as u64))
}
