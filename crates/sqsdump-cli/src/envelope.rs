//! SNS notification envelope, as delivered to SQS subscribers.

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub message_id: Option<String>,
    pub topic_arn: Option<String>,
    pub message: Option<Value>,
    pub timestamp: Option<String>,
}

impl Envelope {
    pub fn parse(body: &str) -> anyhow::Result<Self> {
        serde_json::from_str(body).with_context(|| format!("can't unmarshal message: {body}"))
    }

    /// One-line description for debug logs.
    pub fn describe(&self) -> String {
        format!(
            "{} {} from {} at {}",
            self.kind.as_deref().unwrap_or("-"),
            self.message_id.as_deref().unwrap_or("-"),
            self.topic_arn.as_deref().unwrap_or("-"),
            self.timestamp.as_deref().unwrap_or("-"),
        )
    }
}
