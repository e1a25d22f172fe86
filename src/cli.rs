use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "sitekit", version, about = "Static site image, asset and serving toolkit")]
pub struct Cli {
    /// Config file (defaults to ./sitekit.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the built site
    Serve(ServeArgs),
    /// Run asset pipeline steps
    Assets {
        #[command(subcommand)]
        step: AssetStep,
    },
    /// Check that image sources resolve through the fallback chain
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub public_dir: Option<PathBuf>,
    /// Disable gzip responses
    #[arg(long)]
    pub no_compression: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStep {
    /// Copy uploads to normalized file names and publish them
    Rename,
    /// Generate missing .webp siblings
    Webp,
    /// Minify CSS and JS into min/ directories
    Minify,
    /// Add lazy-loading attributes to <img> tags in HTML
    ImgTags,
    /// Write nginx.conf and .htaccess if missing
    Headers,
    /// Copy uploads and root files into the deployment directory
    Publish,
    /// Every step in order
    All,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Site origin the sources are resolved against
    #[arg(long)]
    pub base: Url,
    /// Give up after this many seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
    #[arg(required = true)]
    pub sources: Vec<String>,
}
