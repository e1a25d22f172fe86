/// Fire-and-forget analytics sink for "section was seen" events.
pub trait ViewTracker {
    fn track_view(&mut self, tracking_id: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracker;

impl ViewTracker for NoopTracker {
    fn track_view(&mut self, _tracking_id: &str) {}
}

/// Logs views instead of shipping them anywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTracker;

impl ViewTracker for LogTracker {
    fn track_view(&mut self, tracking_id: &str) {
        log::info!(target: "viewport.tracking", "view {tracking_id}");
    }
}

impl ViewTracker for Vec<String> {
    fn track_view(&mut self, tracking_id: &str) {
        self.push(tracking_id.to_string());
    }
}
