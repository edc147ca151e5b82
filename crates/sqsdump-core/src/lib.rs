//! # sqsdump-core
//!
//! Core library for draining AWS SQS queues.
//!
//! A [`Drainer`] repeatedly long-polls a queue and passes every message to a
//! caller-supplied [`MessageHandler`], which decides what to print and whether
//! to delete. The run ends when a cancellation flag is raised or when its
//! [`StopPolicy`] is met.
//!
//! ## Features
//!
//! - **Redelivery dedup**: a message delivered twice is handled twice but counted once
//! - **Stop policies**: stop after N distinct messages, at the advertised backlog, or never
//! - **Failure tolerance**: failed polls and failed handlers are logged, never fatal
//! - **Pluggable backend**: anything implementing [`QueueClient`]; [`SqsClient`] ships for SQS
//!
//! ## Example
//!
//! ```no_run
//! use sqsdump::{Drainer, Message, MessageHandler, QueueClient, QueueConfig, SqsClient, StopPolicy};
//!
//! struct DeleteAll;
//!
//! #[async_trait::async_trait]
//! impl<C: QueueClient> MessageHandler<C> for DeleteAll {
//!     async fn handle(&self, drainer: &Drainer<C>, message: &Message) -> anyhow::Result<()> {
//!         println!("{}", message.body);
//!         drainer.delete(message).await
//!     }
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = aws_config::from_env().load().await;
//! let client = SqsClient::from_config(config);
//!
//! let mut drainer = Drainer::new(client, QueueConfig::new("my-dlq"), StopPolicy::AdvertisedTotal).await?;
//! let (_stop, cancel) = tokio::sync::watch::channel(false);
//! let outcome = drainer.drain(cancel, Some(&DeleteAll)).await?;
//! println!("{outcome:?}: {} messages", drainer.distinct_processed());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod drainer;
mod error;
mod progress;
mod sqs;
mod tracker;

#[cfg(test)]
mod test_utils;

pub use client::*;
pub use config::*;
pub use drainer::*;
pub use error::DrainError;
pub use progress::ProgressSink;
pub use sqs::SqsClient;
pub use tracker::DedupTracker;
