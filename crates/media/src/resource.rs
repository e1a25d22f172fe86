use core_types::LoadingStrategy;

use crate::render::{FormatAlternative, ImageRender};
use crate::source::{
    DEFAULT_PLACEHOLDER, ImageFormat, derive_modern_source, direct_path_guess, process_source,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Errored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageOptions {
    /// Explicit `.webp` variant; wins over the derived one.
    pub modern_source: Option<String>,
    /// Explicit `.avif` variant.
    pub next_gen_source: Option<String>,
    pub placeholder: String,
    pub disable_auto_modern: bool,
    /// `None` means the caller gave no hint, which is treated as above the fold.
    pub loading: Option<LoadingStrategy>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sizes: String,
    /// Host of the site serving the page; absolute URLs on other hosts are
    /// never given a derived sibling.
    pub site_host: Option<String>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            modern_source: None,
            next_gen_source: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            disable_auto_modern: false,
            loading: None,
            width: None,
            height: None,
            sizes: "100vw".to_string(),
            site_host: None,
        }
    }
}

impl ImageOptions {
    pub fn above_the_fold(&self) -> bool {
        !matches!(self.loading, Some(LoadingStrategy::Lazy))
    }
}

/// Loading/error lifecycle of a single image.
///
/// Invariants:
/// - `active` only moves forward: primary, then the direct-path guess, then
///   the placeholder. No source is handed out twice.
/// - `Loaded` and `Errored` are terminal until the caller supplies a new
///   requested source.
/// - Callbacks name the source they were issued for; a callback for anything
///   other than the current `active` source is stale and ignored.
#[derive(Clone, Debug)]
pub struct ImageResource {
    requested: String,
    options: ImageOptions,
    derived_modern: Option<String>,
    primary: String,
    direct_guess: Option<String>,
    active: String,
    tried_guess: bool,
    attempts: u32,
    state: LoadState,
}

impl ImageResource {
    pub fn new(requested: impl Into<String>, options: ImageOptions) -> Self {
        let requested = requested.into();
        let primary = process_source(&requested).to_string();

        let derived_modern = if options.disable_auto_modern || options.modern_source.is_some() {
            None
        } else {
            derive_modern_source(&primary, options.site_host.as_deref())
        };

        let direct_guess = direct_path_guess(&primary)
            .filter(|guess| *guess != primary && *guess != options.placeholder);

        let (active, state) = if primary.is_empty() {
            log::debug!(target: "media.resource", "empty image source, showing placeholder");
            (options.placeholder.clone(), LoadState::Errored)
        } else {
            (primary.clone(), LoadState::Loading)
        };

        Self {
            requested,
            options,
            derived_modern,
            primary,
            direct_guess,
            active,
            tried_guess: false,
            attempts: 1,
            state,
        }
    }

    /// Replaces the requested source and resets the lifecycle. Supplying the
    /// same source again is a no-op. Returns `true` if a reset happened.
    pub fn set_requested_source(&mut self, requested: impl Into<String>) -> bool {
        let options = self.options.clone();
        self.set_source(requested, options)
    }

    /// Replaces source and options together; a change to either resets the
    /// lifecycle.
    pub fn set_source(&mut self, requested: impl Into<String>, options: ImageOptions) -> bool {
        let requested = requested.into();
        if requested == self.requested && options == self.options {
            return false;
        }
        *self = Self::new(requested, options);
        true
    }

    pub fn requested_source(&self) -> &str {
        &self.requested
    }

    pub fn active_source(&self) -> &str {
        &self.active
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn options(&self) -> &ImageOptions {
        &self.options
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Number of sources handed to the render layer so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Modern-format variant actually offered: explicit first, derived second.
    pub fn modern_source(&self) -> Option<&str> {
        self.options
            .modern_source
            .as_deref()
            .or(self.derived_modern.as_deref())
    }

    /// Every source this image might resolve to, in preference order.
    pub fn candidates(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(5);
        if let Some(modern) = self.modern_source() {
            out.push(modern);
        }
        if let Some(next_gen) = self.options.next_gen_source.as_deref() {
            out.push(next_gen);
        }
        if !self.primary.is_empty() {
            out.push(self.primary.as_str());
        }
        if let Some(guess) = self.direct_guess.as_deref() {
            out.push(guess);
        }
        out.push(self.options.placeholder.as_str());
        out
    }

    /// The render layer reports that `source` loaded. Returns `true` if the
    /// callback was applied.
    pub fn on_load_succeeded(&mut self, source: &str) -> bool {
        if source != self.active {
            log::trace!(target: "media.resource", "stale load for {source}, active is {}", self.active);
            return false;
        }
        match self.state {
            LoadState::Loading => {
                log::debug!(target: "media.resource", "loaded {source}");
                self.state = LoadState::Loaded;
                true
            }
            LoadState::Loaded => true,
            LoadState::Errored => false,
        }
    }

    /// The render layer reports that `source` failed. Advances the fallback
    /// chain by one step. Returns `true` if the callback was applied.
    pub fn on_load_failed(&mut self, source: &str) -> bool {
        if source != self.active {
            log::trace!(target: "media.resource", "stale error for {source}, active is {}", self.active);
            return false;
        }
        if self.state != LoadState::Loading {
            return false;
        }

        if self.active == self.options.placeholder {
            log::debug!(target: "media.resource", "placeholder {source} failed, giving up");
            self.state = LoadState::Errored;
            return true;
        }

        let next = match self.direct_guess.as_deref() {
            Some(guess) if !self.tried_guess && self.active != guess => {
                self.tried_guess = true;
                guess.to_string()
            }
            _ => self.options.placeholder.clone(),
        };

        log::debug!(target: "media.resource", "{source} failed, falling back to {next}");
        self.active = next;
        self.attempts += 1;
        true
    }

    pub fn describe_render(&self) -> ImageRender {
        let above_the_fold = self.options.above_the_fold();

        let mut alternatives = Vec::with_capacity(2);
        if let Some(avif) = self.options.next_gen_source.as_deref() {
            alternatives.push(FormatAlternative::new(ImageFormat::Avif, avif));
        }
        if let Some(webp) = self.modern_source() {
            alternatives.push(FormatAlternative::new(ImageFormat::WebP, webp));
        }

        ImageRender {
            alternatives,
            source: self.active.clone(),
            loading: if above_the_fold {
                LoadingStrategy::Eager
            } else {
                LoadingStrategy::Lazy
            },
            show_skeleton: self.state == LoadState::Loading && !above_the_fold,
            loaded: self.state == LoadState::Loaded,
            degraded: self.state == LoadState::Errored,
            width: self.options.width,
            height: self.options.height,
            sizes: self.options.sizes.clone(),
        }
    }
}
