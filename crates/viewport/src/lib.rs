//! # viewport
//!
//! Viewport-driven lazy mounting.
//!
//! A [`ViewportGate`] wraps a content subtree and reports a placeholder until
//! the wrapper element comes within the preload margin of the viewport. The
//! host runtime is reached only through [`IntersectionPlatform`] and
//! [`ViewTracker`], so the gate is driven entirely by injected fakes in tests.
//!
//! State machine:
//!
//! ```text
//! Unobserved --attach--> Observing --intersecting--> Visible
//!      \______ priority / no platform support ______/
//! ```

mod gate;
mod margin;
mod platform;
mod tracking;

pub use gate::{
    DEFAULT_PLACEHOLDER_HEIGHT, DEFAULT_THRESHOLD, GateConfig, GateRender, GateState,
    PlaceholderSpec, ViewportGate,
};
pub use margin::{MarginLength, MarginParseError, RootMargin};
pub use platform::{
    IntersectionEntry, IntersectionPlatform, NoIntersection, ObservationHandle, ObserveOptions,
    Subscription,
};
pub use tracking::{LogTracker, NoopTracker, ViewTracker};
