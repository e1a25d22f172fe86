use super::*;
use crate::platform::{NoIntersection, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Counts {
    observed: usize,
    disconnected: usize,
    last_options: Option<ObserveOptions>,
}

#[derive(Clone, Default)]
struct FakePlatform {
    counts: Rc<RefCell<Counts>>,
}

struct FakeSubscription {
    counts: Rc<RefCell<Counts>>,
}

impl Subscription for FakeSubscription {
    fn disconnect(&mut self) {
        self.counts.borrow_mut().disconnected += 1;
    }
}

impl IntersectionPlatform for FakePlatform {
    fn supports_intersection(&self) -> bool {
        true
    }

    fn observe(&self, _element: ElementId, options: &ObserveOptions) -> Box<dyn Subscription> {
        let mut counts = self.counts.borrow_mut();
        counts.observed += 1;
        counts.last_options = Some(*options);
        Box::new(FakeSubscription {
            counts: self.counts.clone(),
        })
    }
}

impl FakePlatform {
    fn observed(&self) -> usize {
        self.counts.borrow().observed
    }

    fn disconnected(&self) -> usize {
        self.counts.borrow().disconnected
    }
}

fn tracked_gate() -> ViewportGate {
    ViewportGate::new(GateConfig {
        tracking_id: Some("services-section".into()),
        ..GateConfig::default()
    })
}

#[test]
fn single_intersection_latches_and_tracks_once() {
    let platform = FakePlatform::default();
    let mut tracker: Vec<String> = Vec::new();
    let mut gate = tracked_gate();

    gate.attach(ElementId(1), &platform);
    assert_eq!(gate.state(), GateState::Observing);
    assert_eq!(platform.observed(), 1);
    assert!(matches!(gate.describe_render(), GateRender::Placeholder(_)));

    assert!(gate.on_intersection(IntersectionEntry::entering(0.4), &mut tracker));
    assert!(gate.is_visible());
    assert!(!gate.holds_subscription());
    assert_eq!(platform.disconnected(), 1);

    for _ in 0..3 {
        assert!(!gate.on_intersection(IntersectionEntry::entering(1.0), &mut tracker));
        assert!(!gate.on_intersection(IntersectionEntry::leaving(), &mut tracker));
    }
    assert!(gate.is_visible());
    assert_eq!(tracker, ["services-section"]);
    assert_eq!(gate.describe_render(), GateRender::Children);
}

#[test]
fn non_intersecting_entries_keep_observing() {
    let platform = FakePlatform::default();
    let mut tracker: Vec<String> = Vec::new();
    let mut gate = tracked_gate();
    gate.attach(ElementId(1), &platform);

    assert!(!gate.on_intersection(IntersectionEntry::leaving(), &mut tracker));
    assert_eq!(gate.state(), GateState::Observing);
    assert!(gate.holds_subscription());
    assert!(tracker.is_empty());
}

#[test]
fn priority_never_subscribes() {
    let platform = FakePlatform::default();
    let mut gate = ViewportGate::new(GateConfig {
        priority: true,
        ..GateConfig::default()
    });
    assert_eq!(gate.describe_render(), GateRender::Children);

    gate.attach(ElementId(7), &platform);
    assert_eq!(platform.observed(), 0);
    assert!(gate.is_visible());
}

#[test]
fn missing_capability_mounts_immediately() {
    let mut tracker: Vec<String> = Vec::new();
    let mut gate = tracked_gate();
    gate.attach(ElementId(1), &NoIntersection);
    assert!(gate.is_visible());
    assert!(!gate.holds_subscription());
    assert!(!gate.on_intersection(IntersectionEntry::entering(1.0), &mut tracker));
    assert!(tracker.is_empty());
}

#[test]
fn teardown_releases_exactly_once() {
    let platform = FakePlatform::default();
    let mut gate = tracked_gate();
    gate.attach(ElementId(1), &platform);

    assert!(gate.teardown());
    assert!(!gate.teardown());
    assert_eq!(platform.disconnected(), 1);

    let mut tracker: Vec<String> = Vec::new();
    assert!(!gate.on_intersection(IntersectionEntry::entering(1.0), &mut tracker));
    assert!(tracker.is_empty());

    drop(gate);
    assert_eq!(platform.disconnected(), 1);
}

#[test]
fn teardown_after_visible_is_a_noop() {
    let platform = FakePlatform::default();
    let mut tracker = crate::NoopTracker;
    let mut gate = tracked_gate();
    gate.attach(ElementId(1), &platform);
    gate.on_intersection(IntersectionEntry::entering(0.2), &mut tracker);

    assert!(!gate.teardown());
    assert_eq!(platform.disconnected(), 1);
}

#[test]
fn dropping_an_observing_gate_releases() {
    let platform = FakePlatform::default();
    let mut gate = tracked_gate();
    gate.attach(ElementId(1), &platform);
    drop(gate);
    assert_eq!(platform.disconnected(), 1);
}

#[test]
fn teardown_before_attach_is_valid() {
    let platform = FakePlatform::default();
    let mut gate = tracked_gate();
    assert!(!gate.teardown());
    gate.attach(ElementId(1), &platform);
    assert_eq!(platform.observed(), 0);
}

#[test]
fn second_attach_is_ignored() {
    let platform = FakePlatform::default();
    let mut gate = tracked_gate();
    gate.attach(ElementId(1), &platform);
    gate.attach(ElementId(1), &platform);
    assert_eq!(platform.observed(), 1);
}

#[test]
fn observe_options_carry_config() {
    let platform = FakePlatform::default();
    let mut gate = ViewportGate::new(GateConfig {
        threshold: 1.7,
        preload_margin: "50px".into(),
        ..GateConfig::default()
    });
    gate.attach(ElementId(1), &platform);

    let options = platform.counts.borrow().last_options.unwrap();
    assert_eq!(options.threshold, 1.0);
    assert_eq!(options.root_margin, "50px".parse().unwrap());
}

#[test]
fn bad_margin_falls_back_to_default() {
    let gate = ViewportGate::new(GateConfig {
        preload_margin: "soon".into(),
        ..GateConfig::default()
    });
    assert_eq!(gate.observe_options().root_margin, RootMargin::default());
}

#[test]
fn placeholder_reports_height_and_kind() {
    let gate = ViewportGate::new(GateConfig::section("clients-section", 250));
    let render = gate.describe_render();
    assert_eq!(
        render,
        GateRender::Placeholder(PlaceholderSpec {
            height: 250,
            kind: PlaceholderKind::Section,
        })
    );
    assert_eq!(render.min_height(), Some(250));
    assert!(!render.observed());
}
