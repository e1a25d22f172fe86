use core_types::{ElementId, PlaceholderKind};

use crate::margin::RootMargin;
use crate::platform::{IntersectionEntry, IntersectionPlatform, ObservationHandle, ObserveOptions};
use crate::tracking::ViewTracker;

pub const DEFAULT_THRESHOLD: f32 = 0.1;
pub const DEFAULT_PLACEHOLDER_HEIGHT: u32 = 200;

#[derive(Clone, Debug, PartialEq)]
pub struct GateConfig {
    /// Above-the-fold content: visible from construction, never observed.
    pub priority: bool,
    pub threshold: f32,
    pub preload_margin: String,
    pub placeholder_height: u32,
    pub placeholder_kind: PlaceholderKind,
    pub tracking_id: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            priority: false,
            threshold: DEFAULT_THRESHOLD,
            preload_margin: RootMargin::DEFAULT.to_string(),
            placeholder_height: DEFAULT_PLACEHOLDER_HEIGHT,
            placeholder_kind: PlaceholderKind::Default,
            tracking_id: None,
        }
    }
}

impl GateConfig {
    pub fn section(tracking_id: &str, placeholder_height: u32) -> Self {
        Self {
            placeholder_height,
            placeholder_kind: PlaceholderKind::Section,
            tracking_id: Some(tracking_id.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Unobserved,
    Observing,
    Visible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaceholderSpec {
    pub height: u32,
    pub kind: PlaceholderKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateRender {
    Children,
    Placeholder(PlaceholderSpec),
}

impl GateRender {
    /// Mirrors the `data-observed` marker on the wrapper element.
    pub fn observed(&self) -> bool {
        matches!(self, GateRender::Children)
    }

    /// Minimum height reserved by the wrapper; `None` means auto.
    pub fn min_height(&self) -> Option<u32> {
        match self {
            GateRender::Children => None,
            GateRender::Placeholder(spec) => Some(spec.height),
        }
    }
}

/// Defers mounting of a subtree until it nears the viewport.
///
/// Invariants:
/// - `Visible` is a one-way latch; nothing moves the gate out of it.
/// - The intersection subscription is released exactly once, by whichever of
///   "became visible", `teardown` or drop happens first.
/// - At most one view-tracking event per gate.
#[derive(Debug)]
pub struct ViewportGate {
    config: GateConfig,
    root_margin: RootMargin,
    state: GateState,
    handle: Option<ObservationHandle>,
    tracked: bool,
    torn_down: bool,
}

impl ViewportGate {
    pub fn new(config: GateConfig) -> Self {
        let root_margin = config.preload_margin.parse().unwrap_or_else(|err| {
            log::warn!(
                target: "viewport.gate",
                "{err}; using {}",
                RootMargin::DEFAULT
            );
            RootMargin::default()
        });

        let state = if config.priority {
            GateState::Visible
        } else {
            GateState::Unobserved
        };

        Self {
            config,
            root_margin,
            state,
            handle: None,
            tracked: false,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == GateState::Visible
    }

    pub fn holds_subscription(&self) -> bool {
        self.handle.as_ref().is_some_and(ObservationHandle::is_held)
    }

    pub fn observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            threshold: self.config.threshold.clamp(0.0, 1.0),
            root_margin: self.root_margin,
        }
    }

    /// Called once the wrapper element exists. Only the first call on an
    /// unobserved gate does anything.
    pub fn attach(&mut self, element: ElementId, platform: &dyn IntersectionPlatform) {
        if self.state != GateState::Unobserved || self.torn_down {
            return;
        }

        if !platform.supports_intersection() {
            log::debug!(target: "viewport.gate", "no intersection support, mounting {element:?} now");
            self.state = GateState::Visible;
            return;
        }

        let subscription = platform.observe(element, &self.observe_options());
        self.handle = Some(ObservationHandle::new(subscription));
        self.state = GateState::Observing;
    }

    /// Intersection callback. Returns `true` only for the event that flipped
    /// the gate to visible.
    pub fn on_intersection(
        &mut self,
        entry: IntersectionEntry,
        tracker: &mut dyn ViewTracker,
    ) -> bool {
        if self.state != GateState::Observing || self.torn_down || !entry.is_intersecting {
            return false;
        }

        self.state = GateState::Visible;
        self.release();

        if let Some(id) = self.config.tracking_id.as_deref()
            && !self.tracked
        {
            self.tracked = true;
            tracker.track_view(id);
        }
        true
    }

    /// Releases a still-held subscription. Safe from any state, any number
    /// of times.
    pub fn teardown(&mut self) -> bool {
        self.torn_down = true;
        self.release()
    }

    fn release(&mut self) -> bool {
        self.handle.as_mut().is_some_and(ObservationHandle::release)
    }

    pub fn describe_render(&self) -> GateRender {
        if self.is_visible() {
            GateRender::Children
        } else {
            GateRender::Placeholder(PlaceholderSpec {
                height: self.config.placeholder_height,
                kind: self.config.placeholder_kind,
            })
        }
    }
}

#[cfg(test)]
mod tests;
