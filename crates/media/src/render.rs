use core_types::LoadingStrategy;

use crate::source::ImageFormat;

/// One `<source type=.. srcset=..>` style preference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatAlternative {
    pub format: ImageFormat,
    pub mime: &'static str,
    pub srcset: String,
}

impl FormatAlternative {
    pub(crate) fn new(format: ImageFormat, srcset: &str) -> Self {
        Self {
            format,
            mime: format.mime(),
            srcset: srcset.to_string(),
        }
    }
}

/// Everything the presentation layer needs to draw one image. Pure data,
/// recomputed from the resource state on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRender {
    pub alternatives: Vec<FormatAlternative>,
    pub source: String,
    pub loading: LoadingStrategy,
    pub show_skeleton: bool,
    pub loaded: bool,
    /// Set once every fallback failed; presentation may desaturate.
    pub degraded: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sizes: String,
}

impl ImageRender {
    pub fn uses_picture(&self) -> bool {
        !self.alternatives.is_empty()
    }
}
