//! Cache policy by asset class, shared by the static server and the
//! generated nginx/Apache configs.

use std::time::Duration;

const DAY: u64 = 24 * 60 * 60;

pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "ico", "svg", "webp", "avif"];
pub const FONT_EXTENSIONS: [&str; 5] = ["woff", "woff2", "ttf", "otf", "eot"];
pub const SCRIPT_EXTENSIONS: [&str; 2] = ["js", "mjs"];
pub const STYLE_EXTENSIONS: [&str; 1] = ["css"];
pub const DATA_EXTENSIONS: [&str; 2] = ["json", "xml"];
pub const HTML_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Already-compressed formats that gain nothing from gzip.
pub const PRECOMPRESSED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "ico", "svg"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetClass {
    /// Extensionless path other than `/`.
    Directory,
    Html,
    Script,
    Style,
    Image,
    Font,
    Data,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expires {
    /// `Expires: 0`, already stale.
    Past,
    After(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    pub cache_control: &'static str,
    pub expires: Expires,
    pub pragma_no_cache: bool,
}

const LONG_LIVED: &str = "public, max-age=31536000";

fn extension(path: &str) -> Option<&str> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let name = path.rsplit('/').next()?;
    let dot = name.rfind('.')?;
    Some(&name[dot + 1..])
}

fn in_list(ext: &str, list: &[&str]) -> bool {
    list.iter().any(|c| ext.eq_ignore_ascii_case(c))
}

impl AssetClass {
    pub fn for_path(path: &str) -> Self {
        if path == "/" || path.is_empty() {
            return AssetClass::Html;
        }
        let Some(ext) = extension(path) else {
            return AssetClass::Directory;
        };

        if in_list(ext, &HTML_EXTENSIONS) {
            AssetClass::Html
        } else if in_list(ext, &SCRIPT_EXTENSIONS) {
            AssetClass::Script
        } else if in_list(ext, &STYLE_EXTENSIONS) {
            AssetClass::Style
        } else if in_list(ext, &IMAGE_EXTENSIONS) {
            AssetClass::Image
        } else if in_list(ext, &FONT_EXTENSIONS) {
            AssetClass::Font
        } else if in_list(ext, &DATA_EXTENSIONS) {
            AssetClass::Data
        } else {
            AssetClass::Other
        }
    }

    /// Fingerprinted build outputs: safe to cache for a year.
    pub fn is_long_lived(self) -> bool {
        matches!(
            self,
            AssetClass::Script | AssetClass::Style | AssetClass::Image | AssetClass::Font
        )
    }

    pub fn policy(self) -> Option<CachePolicy> {
        let policy = match self {
            AssetClass::Directory => CachePolicy {
                cache_control: "no-store, no-cache, must-revalidate, proxy-revalidate",
                expires: Expires::Past,
                pragma_no_cache: true,
            },
            AssetClass::Html => CachePolicy {
                cache_control: "no-cache",
                expires: Expires::After(Duration::from_secs(DAY)),
                pragma_no_cache: false,
            },
            AssetClass::Script | AssetClass::Style => CachePolicy {
                cache_control: LONG_LIVED,
                expires: Expires::After(Duration::from_secs(7 * DAY)),
                pragma_no_cache: false,
            },
            AssetClass::Image => CachePolicy {
                cache_control: LONG_LIVED,
                expires: Expires::After(Duration::from_secs(30 * DAY)),
                pragma_no_cache: false,
            },
            AssetClass::Font => CachePolicy {
                cache_control: LONG_LIVED,
                expires: Expires::After(Duration::from_secs(365 * DAY)),
                pragma_no_cache: false,
            },
            AssetClass::Data => CachePolicy {
                cache_control: "public, max-age=86400, must-revalidate",
                expires: Expires::After(Duration::from_secs(DAY)),
                pragma_no_cache: false,
            },
            AssetClass::Other => return None,
        };
        Some(policy)
    }
}

/// Requests that look like directory listings: extensionless, ending in
/// `/`, not the root and not under `/api/`.
pub fn is_directory_listing(path: &str) -> bool {
    path != "/" && path.ends_with('/') && !path.contains('.') && !path.starts_with("/api/")
}

pub fn is_precompressed(path: &str) -> bool {
    extension(path).is_some_and(|ext| in_list(ext, &PRECOMPRESSED_EXTENSIONS))
}
