//! Optional sink notified once per newly distinct message.

use tokio::sync::mpsc::UnboundedSender;

pub trait ProgressSink: Send + Sync {
    fn inc(&self, delta: u64);

    /// Called once when the drain returns.
    fn finish(&self) {}
}

impl ProgressSink for indicatif::ProgressBar {
    fn inc(&self, delta: u64) {
        indicatif::ProgressBar::inc(self, delta);
    }

    fn finish(&self) {
        self.finish_and_clear();
    }
}

/// Forwards every increment over a channel; a closed channel is ignored.
impl ProgressSink for UnboundedSender<u64> {
    fn inc(&self, delta: u64) {
        let _ = self.send(delta);
    }
}
