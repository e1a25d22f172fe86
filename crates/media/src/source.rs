//! Syntactic helpers over image source strings.
//!
//! Nothing here touches the network. Derived candidates are only offered to
//! the render layer as format preferences; whether they exist is decided by
//! whoever fetches them.

use url::Url;

pub const DEFAULT_PLACEHOLDER: &str = "/images/placeholder.svg";

/// Top-level directory the asset pipeline copies normalized images into.
pub const DIRECT_PATH_DIR: &str = "/images";

pub const MODERN_EXTENSION: &str = "webp";

/// Raster extensions the asset pipeline generates `.webp` siblings for.
pub const DERIVABLE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Preferred alternate encodings, best compression first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Avif,
    WebP,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Avif => "image/avif",
            ImageFormat::WebP => "image/webp",
        }
    }
}

pub(crate) fn process_source(src: &str) -> &str {
    src.trim()
}

pub fn is_data_uri(src: &str) -> bool {
    src.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Returns `true` when `src` is an absolute (or protocol-relative) URL whose
/// host is not `site_host`. Without a configured site host every absolute
/// URL counts as foreign.
pub fn is_cross_origin(src: &str, site_host: Option<&str>) -> bool {
    let parsed = if src.starts_with("//") {
        Url::parse(&format!("https:{src}"))
    } else {
        Url::parse(src)
    };

    let Ok(url) = parsed else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match (url.host_str(), site_host) {
        (Some(host), Some(site)) => !host.eq_ignore_ascii_case(site),
        _ => true,
    }
}

fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    let dot = name.rfind('.')?;
    Some(&name[dot + 1..])
}

/// Derives the same-path `.webp` sibling the asset pipeline would have
/// produced, or `None` when the source is not eligible.
pub fn derive_modern_source(src: &str, site_host: Option<&str>) -> Option<String> {
    if src.is_empty() || src.contains('?') || is_data_uri(src) {
        return None;
    }
    if is_cross_origin(src, site_host) {
        return None;
    }

    let ext = extension(src)?;
    if ext.eq_ignore_ascii_case(MODERN_EXTENSION) || ext.eq_ignore_ascii_case("svg") {
        return None;
    }
    if !DERIVABLE_EXTENSIONS
        .iter()
        .any(|candidate| ext.eq_ignore_ascii_case(candidate))
    {
        return None;
    }

    let base = &src[..src.len() - ext.len()];
    Some(format!("{base}{MODERN_EXTENSION}"))
}

/// Guesses where the file would live if it had been copied flat into
/// [`DIRECT_PATH_DIR`]: only the final path segment survives.
pub fn direct_path_guess(src: &str) -> Option<String> {
    if src.is_empty() || is_data_uri(src) {
        return None;
    }

    let without_suffix = src
        .split(['?', '#'])
        .next()
        .unwrap_or(src)
        .trim_end_matches('/');
    let file_name = without_suffix.rsplit('/').next()?;
    if file_name.is_empty() || file_name.contains(':') {
        return None;
    }

    Some(format!("{DIRECT_PATH_DIR}/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_webp_for_local_rasters() {
        assert_eq!(
            derive_modern_source("/images/team.jpg", None).as_deref(),
            Some("/images/team.webp")
        );
        assert_eq!(
            derive_modern_source("photo.JPEG", None).as_deref(),
            Some("photo.webp")
        );
        assert_eq!(
            derive_modern_source("assets/logo.png", None).as_deref(),
            Some("assets/logo.webp")
        );
    }

    #[test]
    fn skips_ineligible_sources() {
        assert_eq!(derive_modern_source("icon.svg", None), None);
        assert_eq!(derive_modern_source("hero.webp", None), None);
        assert_eq!(derive_modern_source("hero.jpg?w=200", None), None);
        assert_eq!(
            derive_modern_source("data:image/png;base64,AAAA", None),
            None
        );
        assert_eq!(derive_modern_source("/docs/brochure.pdf", None), None);
        assert_eq!(derive_modern_source("/images/noext", None), None);
    }

    #[test]
    fn cross_origin_depends_on_site_host() {
        let src = "https://cdn.example.net/a.jpg";
        assert_eq!(derive_modern_source(src, Some("example.com")), None);
        assert_eq!(derive_modern_source(src, None), None);
        assert_eq!(
            derive_modern_source("https://example.com/a.jpg", Some("example.com")).as_deref(),
            Some("https://example.com/a.webp")
        );
        assert!(is_cross_origin("//cdn.example.net/a.jpg", Some("example.com")));
        assert!(!is_cross_origin("/images/a.jpg", Some("example.com")));
    }

    #[test]
    fn direct_path_keeps_only_file_name() {
        assert_eq!(
            direct_path_guess("photo.jpg").as_deref(),
            Some("/images/photo.jpg")
        );
        assert_eq!(
            direct_path_guess("/src/assets/team/lead.png?v=3").as_deref(),
            Some("/images/lead.png")
        );
        assert_eq!(direct_path_guess("data:image/gif;base64,R0lG"), None);
        assert_eq!(direct_path_guess(""), None);
    }
}
