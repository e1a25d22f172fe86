use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use assets::PipelineConfig;
use serde::Deserialize;
use server::ServerConfig;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "sitekit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Host the site is served from; absolute image URLs on other hosts
    /// never get a derived `.webp` sibling.
    pub host: Option<String>,
    pub placeholder: String,
    /// Project root the `[assets]` paths are relative to.
    pub asset_dir: PathBuf,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            host: None,
            placeholder: media::DEFAULT_PLACEHOLDER.to_string(),
            asset_dir: PathBuf::from("."),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub server: ServerConfig,
    pub assets: PipelineConfig,
}

impl SiteConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An explicit path must exist. Without one, `sitekit.toml` in the
    /// working directory is used if present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    log::debug!(target: "config", "no {DEFAULT_CONFIG_FILE}, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&path, &text)?;
        log::info!(target: "config", "loaded {}", path.display());
        Ok(config)
    }

    /// `[assets]` with every path resolved against `[site] asset_dir`.
    pub fn pipeline(&self) -> PipelineConfig {
        self.assets.rooted(&self.site.asset_dir)
    }

    pub fn site_host(&self) -> &str {
        self.site.host.as_deref().unwrap_or("localhost")
    }
}
