//! Queue configuration and the rule deciding when a drain is finished.

use crate::error::DrainError;

/// Upper bound SQS accepts for `MaxNumberOfMessages`.
pub const MAX_MESSAGES_LIMIT: i32 = 10;
/// Upper bound SQS accepts for `WaitTimeSeconds`.
pub const WAIT_TIME_LIMIT: i32 = 20;

/// Immutable description of the queue to drain and how to poll it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueConfig {
    pub queue_name: String,
    pub max_messages_per_retrieval: i32,
    pub wait_time_seconds: i32,
}

impl QueueConfig {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            max_messages_per_retrieval: 2,
            wait_time_seconds: 2,
        }
    }

    pub fn with_max_messages(mut self, max_messages: i32) -> Self {
        self.max_messages_per_retrieval = max_messages;
        self
    }

    pub fn with_wait_time(mut self, seconds: i32) -> Self {
        self.wait_time_seconds = seconds;
        self
    }

    pub fn validate(&self) -> Result<(), DrainError> {
        if self.queue_name.trim().is_empty() {
            return Err(DrainError::InvalidConfig(
                "queue name must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_MESSAGES_LIMIT).contains(&self.max_messages_per_retrieval) {
            return Err(DrainError::InvalidConfig(format!(
                "max messages per retrieval must be between 1 and {MAX_MESSAGES_LIMIT}, got {}",
                self.max_messages_per_retrieval
            )));
        }
        if !(0..=WAIT_TIME_LIMIT).contains(&self.wait_time_seconds) {
            return Err(DrainError::InvalidConfig(format!(
                "wait time must be between 0 and {WAIT_TIME_LIMIT} seconds, got {}",
                self.wait_time_seconds
            )));
        }
        Ok(())
    }
}

/// When a drain run ends on its own, without being cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopPolicy {
    /// Keep polling until cancelled.
    Never,
    /// Stop once this many distinct messages were processed.
    DistinctCount(u64),
    /// Stop once the distinct count reaches the backlog advertised at startup.
    AdvertisedTotal,
}

impl StopPolicy {
    pub fn validate(&self) -> Result<(), DrainError> {
        match self {
            StopPolicy::DistinctCount(0) => Err(DrainError::InvalidConfig(
                "stop count must be greater than zero".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Whether a run with `distinct` processed messages is done.
    pub fn is_satisfied(&self, distinct: u64, advertised: u64) -> bool {
        match *self {
            StopPolicy::Never => false,
            StopPolicy::DistinctCount(cap) => cap > 0 && distinct >= cap,
            StopPolicy::AdvertisedTotal => distinct >= advertised,
        }
    }
}
