/// Decides what to warm up once a section scrolls into view. Owned by the
/// page host; gates and images never call it.
pub trait PrefetchScheduler {
    fn section_visible(&mut self, tracking_id: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPrefetch;

impl PrefetchScheduler for NoopPrefetch {
    fn section_visible(&mut self, _tracking_id: &str) {}
}

/// Remembers visible sections in order, for hosts that batch prefetch work
/// until they are idle.
#[derive(Clone, Debug, Default)]
pub struct RecordingPrefetch {
    pub visible: Vec<String>,
}

impl PrefetchScheduler for RecordingPrefetch {
    fn section_visible(&mut self, tracking_id: &str) {
        if !self.visible.iter().any(|v| v == tracking_id) {
            self.visible.push(tracking_id.to_string());
        }
    }
}
