//! Prints each drained message and deletes it on request.

use anyhow::Context;
use serde_json::Value;
use sqsdump::{Drainer, Message, MessageHandler, QueueClient};

use crate::envelope::Envelope;
use crate::path;

pub struct DumpHandler {
    delete: bool,
    raw: bool,
    json_path: Option<String>,
}

impl DumpHandler {
    pub fn new(delete: bool, raw: bool, json_path: Option<String>) -> Self {
        Self {
            delete,
            raw,
            json_path: json_path.filter(|p| !p.is_empty()),
        }
    }

    /// Text printed for a message body.
    ///
    /// SNS notifications are unwrapped to their inner message unless running
    /// raw; any other JSON body is printed as is.
    pub fn render(&self, body: &str) -> anyhow::Result<String> {
        if self.raw {
            return Ok(body.to_string());
        }

        let envelope = Envelope::parse(body).context("error parsing the incoming message")?;
        log::debug!("{}", envelope.describe());

        let Some(inner) = envelope.message else {
            return Ok(body.to_string());
        };

        match &self.json_path {
            Some(json_path) => by_path(inner, json_path),
            None => Ok(to_text(inner)),
        }
    }
}

fn by_path(inner: Value, json_path: &str) -> anyhow::Result<String> {
    let document = match inner {
        Value::String(text) => serde_json::from_str(&text)
            .with_context(|| format!("inner message is not JSON: {text}"))?,
        other => other,
    };

    let found = path::lookup(&document, json_path)?;
    Ok(to_text(found.clone()))
}

fn to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[async_trait::async_trait]
impl<C: QueueClient> MessageHandler<C> for DumpHandler {
    async fn handle(&self, drainer: &Drainer<C>, message: &Message) -> anyhow::Result<()> {
        let text = self
            .render(&message.body)
            .with_context(|| format!("error processing message {}", message.message_id))?;
        println!("{text}");

        if !self.delete {
            return Ok(());
        }

        drainer
            .delete(message)
            .await
            .with_context(|| format!("error deleting message {}", message.message_id))
    }
}
