//! Amazon SQS implementation of [`QueueClient`].

use anyhow::{anyhow, Context};
use aws_config::SdkConfig;
use aws_sdk_sqs as sqs;
use sqs::types::{MessageSystemAttributeName, QueueAttributeName};

use crate::client::{Attributes, Message, QueueClient, QueueUrl};

/// Client for draining AWS SQS queues.
///
/// # Example
///
/// ```no_run
/// use sqsdump::{QueueClient, SqsClient};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = aws_config::from_env().load().await;
/// let client = SqsClient::from_config(config);
///
/// let url = client.resolve_identity("my-dlq").await?;
/// for message in client.receive(&url, 10, 2).await? {
///     println!("{}", message.body);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqsClient {
    /// The AWS SDK configuration used for SQS operations
    pub config: SdkConfig,
    /// The SQS client instance
    pub client: sqs::Client,
}

impl SqsClient {
    /// Creates an SqsClient from a pre-built AWS SDK config.
    ///
    /// The caller decides on credentials and endpoints (e.g. the `--local`
    /// flag for LocalStack).
    pub fn from_config(config: SdkConfig) -> Self {
        let client = sqs::Client::new(&config);
        Self { config, client }
    }
}

#[async_trait::async_trait]
impl QueueClient for SqsClient {
    async fn resolve_identity(&self, name: &str) -> anyhow::Result<QueueUrl> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .with_context(|| format!("failed to get queue url for {name}"))?;

        output
            .queue_url
            .map(QueueUrl::new)
            .ok_or_else(|| anyhow!("queue url missing in response for {name}"))
    }

    async fn fetch_attributes(
        &self,
        queue: &QueueUrl,
        names: &[&str],
    ) -> anyhow::Result<Attributes> {
        let names = names.iter().map(|name| QueueAttributeName::from(*name)).collect();

        let output = self
            .client
            .get_queue_attributes()
            .queue_url(queue.as_str())
            .set_attribute_names(Some(names))
            .send()
            .await
            .with_context(|| format!("failed to get attributes of {queue}"))?;

        Ok(output
            .attributes
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name.as_str().to_string(), value))
            .collect())
    }

    async fn receive(
        &self,
        queue: &QueueUrl,
        max_messages: i32,
        wait_seconds: i32,
    ) -> anyhow::Result<Vec<Message>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue.as_str())
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .send()
            .await
            .context("failed to receive messages")?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| match Message::try_from(m) {
                Ok(message) => Some(message),
                Err(e) => {
                    log::warn!("skipping message from {queue}: {e}");
                    None
                }
            })
            .collect();

        Ok(messages)
    }

    async fn delete(&self, queue: &QueueUrl, receipt_handle: &str) -> anyhow::Result<()> {
        self.client
            .delete_message()
            .queue_url(queue.as_str())
            .receipt_handle(receipt_handle)
            .send()
            .await
            .with_context(|| format!("failed to delete message from {queue}"))?;

        Ok(())
    }
}

/// Converts an AWS SDK message, failing when the fields needed to count or
/// delete it are missing.
///
/// See the [AWS SQS Message API Reference](https://docs.aws.amazon.com/AWSSimpleQueueService/latest/APIReference/API_Message.html).
impl TryFrom<sqs::types::Message> for Message {
    type Error = anyhow::Error;

    fn try_from(message: sqs::types::Message) -> Result<Self, Self::Error> {
        let message_id = message
            .message_id
            .ok_or_else(|| anyhow!("missing message_id"))?;
        let receipt_handle = message
            .receipt_handle
            .ok_or_else(|| anyhow!("missing receipt_handle for {message_id}"))?;

        Ok(Self {
            message_id,
            receipt_handle,
            body: message.body.unwrap_or_default(),
            md5_of_body: message.md5_of_body,
            attributes: message
                .attributes
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| (name.as_str().to_string(), value))
                .collect(),
        })
    }
}
