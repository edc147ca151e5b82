//! The remote queue capability the drainer is built on.

use std::collections::HashMap;
use std::fmt;

/// Attribute holding the queue's approximate backlog size.
pub const APPROXIMATE_NUMBER_OF_MESSAGES: &str = "ApproximateNumberOfMessages";

/// Queue attributes keyed by attribute name.
pub type Attributes = HashMap<String, String>;

/// Resolved identity of a queue, as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueueUrl(String);

impl QueueUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for QueueUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single delivery of a queue message.
///
/// The drainer only ever looks at `message_id`; the body is passed through to
/// the handler untouched.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Message {
    /// Unique identifier for the message assigned by the backend
    pub message_id: String,
    /// Handle used to delete this particular delivery
    pub receipt_handle: String,
    /// The actual message content
    pub body: String,
    /// MD5 digest of the message body, when the backend supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_of_body: Option<String>,
    /// System attributes attached to the delivery
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl Message {
    pub fn new(
        message_id: impl Into<String>,
        receipt_handle: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            receipt_handle: receipt_handle.into(),
            body: body.into(),
            md5_of_body: None,
            attributes: HashMap::new(),
        }
    }
}

/// Remote operations needed to drain a queue.
///
/// Implement this trait to plug a queue backend into [`crate::Drainer`].
/// [`crate::SqsClient`] is the Amazon SQS implementation.
#[async_trait::async_trait]
pub trait QueueClient: Send + Sync {
    /// Looks up the identity of the queue called `name`.
    async fn resolve_identity(&self, name: &str) -> anyhow::Result<QueueUrl>;

    /// Fetches the named attributes of a queue.
    async fn fetch_attributes(&self, queue: &QueueUrl, names: &[&str])
        -> anyhow::Result<Attributes>;

    /// Long-polls for up to `max_messages`, waiting at most `wait_seconds`.
    ///
    /// An empty batch is a valid answer and means nothing arrived in time.
    async fn receive(
        &self,
        queue: &QueueUrl,
        max_messages: i32,
        wait_seconds: i32,
    ) -> anyhow::Result<Vec<Message>>;

    /// Acknowledges a delivery, removing the message from the queue.
    async fn delete(&self, queue: &QueueUrl, receipt_handle: &str) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl<T: QueueClient + ?Sized> QueueClient for std::sync::Arc<T> {
    async fn resolve_identity(&self, name: &str) -> anyhow::Result<QueueUrl> {
        (**self).resolve_identity(name).await
    }

    async fn fetch_attributes(
        &self,
        queue: &QueueUrl,
        names: &[&str],
    ) -> anyhow::Result<Attributes> {
        (**self).fetch_attributes(queue, names).await
    }

    async fn receive(
        &self,
        queue: &QueueUrl,
        max_messages: i32,
        wait_seconds: i32,
    ) -> anyhow::Result<Vec<Message>> {
        (**self).receive(queue, max_messages, wait_seconds).await
    }

    async fn delete(&self, queue: &QueueUrl, receipt_handle: &str) -> anyhow::Result<()> {
        (**self).delete(queue, receipt_handle).await
    }
}
