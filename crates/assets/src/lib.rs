//! Build-time asset pipeline for the static site: clean upload names,
//! generate `.webp` siblings for the `media` crate to find, minify
//! stylesheets and scripts, mark `<img>` tags for lazy loading, emit web
//! server cache configs and copy uploads into the deployment directory.
//!
//! The cache policy table in [`policy`] is shared with the `server` crate so
//! the dev server and the generated nginx/Apache configs agree.

mod error;
mod img_tags;
pub mod minify;
mod names;
mod pipeline;
pub mod policy;
mod publish;
mod server_config;
mod walk;
mod webp;

pub use error::{AssetError, Result};
pub use img_tags::{ImgTagReport, add_img_attributes, rewrite_img_tags};
pub use minify::{MinifyReport, SourceKind, minify_css, minify_js, minify_tree};
pub use names::{RenameReport, normalize_file_name, rename_images};
pub use pipeline::{
    PipelineConfig, PipelineReport, minify_sources, publish_sources, rename_sources, rewrite_html,
    run_pipeline,
};
pub use policy::{AssetClass, CachePolicy, Expires};
pub use publish::{PublishReport, publish_all, publish_dir, publish_files};
pub use server_config::{
    HTACCESS_FILE, NGINX_FILE, ServerConfigReport, htaccess, nginx_config, write_server_configs,
};
pub use walk::collect_files;
pub use webp::{RASTER_EXTENSIONS, WebpReport, encode_webp, generate_webp_siblings, webp_sibling};
