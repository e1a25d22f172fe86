//! Page-level composition of gates and images.
//!
//! Invariants:
//! - Every gate and image is owned by exactly one `PageHost` entry; nothing
//!   is shared across entries.
//! - An image mounted under a gate stays deferred (no `SourceRequest`, no
//!   `ImageResource`) until that gate becomes visible.
//! - Events are gated through the mount table: callbacks for unmounted ids
//!   or stale sources are dropped before they reach a component.
//! - The host, not the components, talks to the prefetch scheduler.

mod host;
mod prefetch;

pub use host::{PageEvent, PageHost, SourceRequest};
pub use prefetch::{NoopPrefetch, PrefetchScheduler, RecordingPrefetch};
