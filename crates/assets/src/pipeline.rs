use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::img_tags::{ImgTagReport, rewrite_img_tags};
use crate::minify::{MinifyReport, SourceKind, minify_tree};
use crate::names::{RenameReport, rename_images};
use crate::publish::{PublishReport, publish_all};
use crate::server_config::{ServerConfigReport, write_server_configs};
use crate::webp::{WebpReport, generate_webp_siblings};

/// Directory layout the pipeline works on. Every field has a default so a
/// partial `[assets]` table is enough.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Dropped-in uploads whose names get normalized.
    pub source_dirs: Vec<PathBuf>,
    pub public_dir: PathBuf,
    /// Renamed uploads are published here.
    pub images_dir: PathBuf,
    /// Scanned for raster images that lack a `.webp` sibling.
    pub image_dirs: Vec<PathBuf>,
    pub css_dir: PathBuf,
    pub js_dir: PathBuf,
    /// Where `nginx.conf` is written.
    pub config_dir: PathBuf,
    /// HTML whose `<img>` tags get lazy-loading attributes.
    pub html_dirs: Vec<PathBuf>,
    /// Deployment root; uploads land in its `images/` directory.
    pub publish_dir: PathBuf,
    /// Loose project files copied to the top of `publish_dir`.
    pub root_files: Vec<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec![PathBuf::from("attached_assets")],
            public_dir: PathBuf::from("client/public"),
            images_dir: PathBuf::from("client/public/images"),
            image_dirs: vec![
                PathBuf::from("client/public/images"),
                PathBuf::from("attached_assets"),
                PathBuf::from("client/src/assets"),
            ],
            css_dir: PathBuf::from("client/public/css"),
            js_dir: PathBuf::from("client/public/js"),
            config_dir: PathBuf::from("server"),
            html_dirs: vec![PathBuf::from("client")],
            publish_dir: PathBuf::from("dist/public"),
            root_files: vec![PathBuf::from("generated-icon.png")],
        }
    }
}

impl PipelineConfig {
    /// Resolves every relative path against `root`.
    pub fn rooted(&self, root: &std::path::Path) -> Self {
        let join = |p: &PathBuf| root.join(p);
        Self {
            source_dirs: self.source_dirs.iter().map(join).collect(),
            public_dir: join(&self.public_dir),
            images_dir: join(&self.images_dir),
            image_dirs: self.image_dirs.iter().map(join).collect(),
            css_dir: join(&self.css_dir),
            js_dir: join(&self.js_dir),
            config_dir: join(&self.config_dir),
            html_dirs: self.html_dirs.iter().map(join).collect(),
            publish_dir: join(&self.publish_dir),
            root_files: self.root_files.iter().map(join).collect(),
        }
    }

    pub fn css_out_dir(&self) -> PathBuf {
        self.css_dir.join("min")
    }

    pub fn js_out_dir(&self) -> PathBuf {
        self.js_dir.join("min")
    }

    pub fn publish_images_dir(&self) -> PathBuf {
        self.publish_dir.join("images")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub renamed: RenameReport,
    pub webp: WebpReport,
    pub css: MinifyReport,
    pub js: MinifyReport,
    pub img_tags: ImgTagReport,
    pub server_configs: ServerConfigReport,
    pub published: PublishReport,
}

impl PipelineReport {
    pub fn failures(&self) -> usize {
        self.renamed.failed
            + self.webp.failed
            + self.css.failed
            + self.js.failed
            + self.img_tags.failed
            + self.published.failed
    }
}

pub fn rename_sources(config: &PipelineConfig) -> Result<RenameReport> {
    let mut total = RenameReport::default();
    for dir in &config.source_dirs {
        if !dir.is_dir() {
            log::warn!(target: "assets.rename", "source dir {} does not exist", dir.display());
            continue;
        }
        let report = rename_images(dir, &config.images_dir)?;
        total.renamed.extend(report.renamed);
        total.skipped += report.skipped;
        total.failed += report.failed;
    }
    Ok(total)
}

pub fn minify_sources(config: &PipelineConfig, kind: SourceKind) -> Result<MinifyReport> {
    let (dir, out_dir) = match kind {
        SourceKind::Css => (&config.css_dir, config.css_out_dir()),
        SourceKind::Js => (&config.js_dir, config.js_out_dir()),
    };
    if !dir.is_dir() {
        log::warn!(target: "assets.minify", "{} does not exist", dir.display());
        return Ok(MinifyReport::default());
    }
    minify_tree(dir, &out_dir, kind)
}

/// Copies the uploads (with any `.webp` siblings) and root files into the
/// deployment directory.
pub fn publish_sources(config: &PipelineConfig) -> Result<PublishReport> {
    publish_all(
        &config.source_dirs,
        &config.root_files,
        &config.publish_dir,
        &config.publish_images_dir(),
    )
}

pub fn rewrite_html(config: &PipelineConfig) -> Result<ImgTagReport> {
    rewrite_img_tags(&config.html_dirs)
}

/// rename -> webp -> minify css/js -> img tags -> server configs -> publish.
/// Stops at the first structural error; per-file failures are counted in the
/// report.
pub fn run_pipeline(config: &PipelineConfig, host: &str) -> Result<PipelineReport> {
    let renamed = rename_sources(config)?;
    let webp = generate_webp_siblings(&config.image_dirs)?;
    let css = minify_sources(config, SourceKind::Css)?;
    let js = minify_sources(config, SourceKind::Js)?;
    let img_tags = rewrite_html(config)?;
    let server_configs = write_server_configs(&config.config_dir, &config.public_dir, host)?;
    let published = publish_sources(config)?;

    let report = PipelineReport {
        renamed,
        webp,
        css,
        js,
        img_tags,
        server_configs,
        published,
    };
    log::info!(
        target: "assets.pipeline",
        "renamed {}, webp {}, css {}, js {}, html {}, published {}, failures {}",
        report.renamed.renamed.len(),
        report.webp.converted.len(),
        report.css.written.len(),
        report.js.written.len(),
        report.img_tags.updated.len(),
        report.published.copied.len(),
        report.failures()
    );
    Ok(report)
}
