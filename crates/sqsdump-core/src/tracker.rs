use std::collections::HashSet;

/// Set of message ids already counted in the current run.
///
/// Append-only: a redelivered message is remembered for the lifetime of the
/// run so it is never counted twice.
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: HashSet<String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message_id`, returning `true` the first time it is seen.
    pub fn observe(&mut self, message_id: &str) -> bool {
        if self.seen.contains(message_id) {
            return false;
        }
        self.seen.insert(message_id.to_string())
    }

    pub fn distinct(&self) -> u64 {
        self.seen.len() as u64
    }
}
