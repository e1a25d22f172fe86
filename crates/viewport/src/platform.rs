//! Ports the gate uses to reach the host UI runtime.

use core_types::ElementId;

use crate::margin::RootMargin;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserveOptions {
    pub threshold: f32,
    pub root_margin: RootMargin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub ratio: f32,
}

impl IntersectionEntry {
    pub fn entering(ratio: f32) -> Self {
        Self {
            is_intersecting: true,
            ratio,
        }
    }

    pub fn leaving() -> Self {
        Self::default()
    }
}

/// A live intersection subscription owned by exactly one gate.
pub trait Subscription {
    fn disconnect(&mut self);
}

/// Viewport-intersection capability of the host runtime.
pub trait IntersectionPlatform {
    /// Queried once per gate, at attach time.
    fn supports_intersection(&self) -> bool;

    fn observe(&self, element: ElementId, options: &ObserveOptions) -> Box<dyn Subscription>;
}

/// Platform without intersection support; every gate mounts immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIntersection;

impl IntersectionPlatform for NoIntersection {
    fn supports_intersection(&self) -> bool {
        false
    }

    fn observe(&self, _element: ElementId, _options: &ObserveOptions) -> Box<dyn Subscription> {
        Box::new(Detached)
    }
}

struct Detached;

impl Subscription for Detached {
    fn disconnect(&mut self) {}
}

/// Exclusive ownership of a [`Subscription`]. Releasing is idempotent and
/// dropping the handle releases it.
pub struct ObservationHandle {
    inner: Option<Box<dyn Subscription>>,
}

impl ObservationHandle {
    pub fn new(subscription: Box<dyn Subscription>) -> Self {
        Self {
            inner: Some(subscription),
        }
    }

    pub fn is_held(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns `true` only for the call that actually disconnected.
    pub fn release(&mut self) -> bool {
        match self.inner.take() {
            Some(mut subscription) => {
                subscription.disconnect();
                true
            }
            None => false,
        }
    }
}

impl Drop for ObservationHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ObservationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationHandle")
            .field("held", &self.is_held())
            .finish()
    }
}
