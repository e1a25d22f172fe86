//! # media
//!
//! Progressive image loading with format negotiation.
//!
//! An [`ImageResource`] never fetches anything itself. It decides which
//! source string the render layer should use next and reacts to the load and
//! error callbacks the render layer reports back:
//!
//! ```
//! use media::{ImageOptions, ImageResource, LoadState};
//!
//! let mut img = ImageResource::new("photo.jpg", ImageOptions::default());
//! img.on_load_failed("photo.jpg");
//! assert_eq!(img.active_source(), "/images/photo.jpg");
//! assert_eq!(img.state(), LoadState::Loading);
//! ```

mod render;
mod resource;
pub mod source;

pub use render::{FormatAlternative, ImageRender};
pub use resource::{ImageOptions, ImageResource, LoadState};
pub use source::{DEFAULT_PLACEHOLDER, ImageFormat};
