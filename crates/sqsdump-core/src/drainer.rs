//! The poll loop that drains a queue.

use tokio::sync::watch;

use crate::client::{Attributes, Message, QueueClient, QueueUrl, APPROXIMATE_NUMBER_OF_MESSAGES};
use crate::config::{QueueConfig, StopPolicy};
use crate::error::DrainError;
use crate::progress::ProgressSink;
use crate::tracker::DedupTracker;

/// Called once for every received message, duplicates included.
///
/// Printing, deciding on deletion and calling [`Drainer::delete`] all happen
/// here. An error is logged by the drainer and the loop moves on to the next
/// message; the message is not deleted unless the handler already did so.
#[async_trait::async_trait]
pub trait MessageHandler<C: QueueClient>: Send + Sync {
    async fn handle(&self, drainer: &Drainer<C>, message: &Message) -> anyhow::Result<()>;
}

/// How a drain run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    Cancelled,
    CapReached,
    TotalReached,
}

/// Long-polls a single queue and hands each message to a [`MessageHandler`].
///
/// The queue url and backlog size are looked up once in [`Drainer::new`] and
/// never refreshed. A drainer is meant for a single [`Drainer::drain`] run.
///
/// # Example
///
/// ```no_run
/// use sqsdump::{Drainer, Message, MessageHandler, QueueClient, QueueConfig, SqsClient, StopPolicy};
///
/// struct Print;
///
/// #[async_trait::async_trait]
/// impl<C: QueueClient> MessageHandler<C> for Print {
///     async fn handle(&self, _drainer: &Drainer<C>, message: &Message) -> anyhow::Result<()> {
///         println!("{}", message.body);
///         Ok(())
///     }
/// }
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = SqsClient::from_config(aws_config::from_env().load().await);
/// let mut drainer = Drainer::new(client, QueueConfig::new("my-dlq"), StopPolicy::AdvertisedTotal).await?;
///
/// let (_stop, cancel) = tokio::sync::watch::channel(false);
/// drainer.drain(cancel, Some(&Print)).await?;
/// # Ok(())
/// # }
/// ```
pub struct Drainer<C> {
    client: C,
    config: QueueConfig,
    policy: StopPolicy,
    queue_url: QueueUrl,
    advertised_total: u64,
    tracker: DedupTracker,
    progress: Option<Box<dyn ProgressSink>>,
}

impl<C: QueueClient> Drainer<C> {
    /// Validates the configuration, resolves the queue and snapshots its
    /// approximate backlog.
    pub async fn new(
        client: C,
        config: QueueConfig,
        policy: StopPolicy,
    ) -> Result<Self, DrainError> {
        config.validate()?;
        policy.validate()?;

        let queue_url = client
            .resolve_identity(&config.queue_name)
            .await
            .map_err(|source| DrainError::QueueResolution {
                name: config.queue_name.clone(),
                source,
            })?;

        let attributes = client
            .fetch_attributes(&queue_url, &[APPROXIMATE_NUMBER_OF_MESSAGES])
            .await
            .map_err(DrainError::AttributeFetch)?;
        let advertised_total = parse_count(&attributes, APPROXIMATE_NUMBER_OF_MESSAGES)?;

        log::info!(
            "queue {} resolved to {} with ~{} messages",
            config.queue_name,
            queue_url,
            advertised_total
        );

        Ok(Self {
            client,
            config,
            policy,
            queue_url,
            advertised_total,
            tracker: DedupTracker::new(),
            progress: None,
        })
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn queue_url(&self) -> &QueueUrl {
        &self.queue_url
    }

    /// Backlog size reported by the queue at construction. Approximate.
    pub fn advertised_total(&self) -> u64 {
        self.advertised_total
    }

    pub fn distinct_processed(&self) -> u64 {
        self.tracker.distinct()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn policy(&self) -> StopPolicy {
        self.policy
    }

    /// Deletes the delivery `message` came from.
    pub async fn delete(&self, message: &Message) -> anyhow::Result<()> {
        self.client
            .delete(&self.queue_url, &message.receipt_handle)
            .await
    }

    pub async fn queue_attributes(&self, names: &[&str]) -> anyhow::Result<Attributes> {
        self.client.fetch_attributes(&self.queue_url, names).await
    }

    /// Polls until `cancel` flips to `true` or the stop policy is satisfied.
    ///
    /// Receive and handler failures are logged and never end the run. The
    /// cancellation flag is honoured between batches and while waiting on a
    /// long poll, never in the middle of a batch.
    pub async fn drain<H: MessageHandler<C>>(
        &mut self,
        mut cancel: watch::Receiver<bool>,
        handler: Option<&H>,
    ) -> Result<DrainOutcome, DrainError> {
        let handler = handler.ok_or(DrainError::InvalidHandler)?;

        let outcome = self.run(&mut cancel, handler).await;
        if let Some(progress) = &self.progress {
            progress.finish();
        }

        Ok(outcome)
    }

    async fn run<H: MessageHandler<C>>(
        &mut self,
        cancel: &mut watch::Receiver<bool>,
        handler: &H,
    ) -> DrainOutcome {
        loop {
            if *cancel.borrow() {
                log::info!("got cancellation signal, exiting processing");
                return DrainOutcome::Cancelled;
            }
            if let Some(outcome) = self.finished() {
                return outcome;
            }

            let received = tokio::select! {
                result = self.client.receive(
                    &self.queue_url,
                    self.config.max_messages_per_retrieval,
                    self.config.wait_time_seconds,
                ) => result,
                _ = cancelled(cancel) => {
                    log::info!("got cancellation signal while polling, exiting processing");
                    return DrainOutcome::Cancelled;
                }
            };

            let messages = match received {
                Ok(messages) => messages,
                Err(e) => {
                    log::error!("can't get new messages from {}: {:#}", self.queue_url, e);
                    continue;
                }
            };

            for message in &messages {
                if let Err(e) = handler.handle(&*self, message).await {
                    log::error!("processing error for message {}: {:#}", message.message_id, e);
                }

                if self.tracker.observe(&message.message_id) {
                    if let Some(progress) = &self.progress {
                        progress.inc(1);
                    }
                } else {
                    log::debug!("message {} redelivered, already counted", message.message_id);
                }

                if let Some(outcome) = self.finished() {
                    return outcome;
                }
            }
        }
    }

    fn finished(&self) -> Option<DrainOutcome> {
        let distinct = self.tracker.distinct();
        if !self.policy.is_satisfied(distinct, self.advertised_total) {
            return None;
        }

        match self.policy {
            StopPolicy::DistinctCount(_) => {
                log::info!("stopped after {} messages processed", distinct);
                Some(DrainOutcome::CapReached)
            }
            StopPolicy::AdvertisedTotal => {
                log::info!("all {} messages processed", distinct);
                Some(DrainOutcome::TotalReached)
            }
            StopPolicy::Never => None,
        }
    }
}

/// Resolves once `cancel` reads `true`; never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let closed = cancel.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

fn parse_count(attributes: &Attributes, name: &str) -> Result<u64, DrainError> {
    let value = attributes.get(name);
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| DrainError::MalformedAttribute {
            name: name.to_string(),
            value: value.cloned(),
        })
}
