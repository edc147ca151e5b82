use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::anyhow;
use aws_sdk_sqs::config::Credentials;
use testcontainers::ContainerAsync;
use testcontainers_modules::{
    localstack::LocalStack,
    testcontainers::{runners::AsyncRunner, ImageExt, TestcontainersError},
};
use tokio::sync::watch;

use crate::client::{Attributes, Message, QueueClient, QueueUrl, APPROXIMATE_NUMBER_OF_MESSAGES};

pub fn local_config(endpoint_url: &str, region: Option<&'static str>) -> aws_config::ConfigLoader {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(endpoint_url)
        .region(region.unwrap_or("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
}

pub async fn localstack() -> Result<(String, ContainerAsync<LocalStack>), TestcontainersError> {
    let request = LocalStack::default()
        .with_tag("latest")
        .with_env_var("SERVICES", "sqs")
        .with_env_var("SKIP_SSL_CERT_DOWNLOAD", "1");
    let container = request.start().await?;

    let host_ip = container.get_host().await?;
    let host_port = container.get_host_port_ipv4(4566).await?;
    let endpoint_url = format!("http://{host_ip}:{host_port}");

    Ok((endpoint_url, container))
}

/// Generate a queue name that does not collide between tests.
pub fn unique_queue_name(prefix: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!(
        "{prefix}-{nanos}-{}",
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

pub fn msg(id: &str) -> Message {
    Message::new(id, format!("rh-{id}"), format!("body-{id}"))
}

pub fn batch(ids: &[&str]) -> Vec<Message> {
    ids.iter().map(|id| msg(id)).collect()
}

/// In-memory [`QueueClient`] replaying a fixed script of receive results.
///
/// Once the script runs dry it trips the cancellation sender (if one was
/// given) and reports a receive error, mimicking a caller cancelling while
/// the long poll is in flight.
pub struct ScriptedClient {
    pub url: QueueUrl,
    pub fail_resolve: bool,
    pub fail_attributes: bool,
    pub fail_delete: bool,
    pub advertised: Option<String>,
    script: Mutex<VecDeque<anyhow::Result<Vec<Message>>>>,
    cancel_when_exhausted: Option<watch::Sender<bool>>,
    pub resolve_calls: AtomicUsize,
    pub attribute_calls: AtomicUsize,
    pub receive_calls: AtomicUsize,
    pub receive_args: Mutex<Vec<(String, i32, i32)>>,
    pub deleted: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn new(advertised: &str) -> Self {
        Self {
            url: QueueUrl::new("https://sqs.us-east-1.amazonaws.com/000000000000/test-queue"),
            fail_resolve: false,
            fail_attributes: false,
            fail_delete: false,
            advertised: Some(advertised.to_string()),
            script: Mutex::new(VecDeque::new()),
            cancel_when_exhausted: None,
            resolve_calls: AtomicUsize::new(0),
            attribute_calls: AtomicUsize::new(0),
            receive_calls: AtomicUsize::new(0),
            receive_args: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn batch(self, messages: Vec<Message>) -> Self {
        self.script.lock().unwrap().push_back(Ok(messages));
        self
    }

    pub fn receive_error(self, reason: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(anyhow!(reason.to_string())));
        self
    }

    pub fn cancel_when_exhausted(mut self, tx: watch::Sender<bool>) -> Self {
        self.cancel_when_exhausted = Some(tx);
        self
    }

    pub fn receives(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    pub fn deleted_handles(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, handle)| handle.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl QueueClient for ScriptedClient {
    async fn resolve_identity(&self, name: &str) -> anyhow::Result<QueueUrl> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_resolve {
            return Err(anyhow!("queue {name} does not exist"));
        }
        Ok(self.url.clone())
    }

    async fn fetch_attributes(
        &self,
        queue: &QueueUrl,
        names: &[&str],
    ) -> anyhow::Result<Attributes> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(queue, &self.url);
        if self.fail_attributes {
            return Err(anyhow!("connection reset"));
        }
        let mut attrs = Attributes::new();
        if names.contains(&APPROXIMATE_NUMBER_OF_MESSAGES) {
            if let Some(value) = &self.advertised {
                attrs.insert(APPROXIMATE_NUMBER_OF_MESSAGES.to_string(), value.clone());
            }
        }
        Ok(attrs)
    }

    async fn receive(
        &self,
        queue: &QueueUrl,
        max_messages: i32,
        wait_seconds: i32,
    ) -> anyhow::Result<Vec<Message>> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        self.receive_args.lock().unwrap().push((
            queue.as_str().to_string(),
            max_messages,
            wait_seconds,
        ));

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => {
                if let Some(tx) = &self.cancel_when_exhausted {
                    let _ = tx.send(true);
                }
                tokio::task::yield_now().await;
                Err(anyhow!("script exhausted"))
            }
        }
    }

    async fn delete(&self, queue: &QueueUrl, receipt_handle: &str) -> anyhow::Result<()> {
        if self.fail_delete {
            return Err(anyhow!("access denied deleting {receipt_handle}"));
        }
        self.deleted
            .lock()
            .unwrap()
            .push((queue.as_str().to_string(), receipt_handle.to_string()));
        Ok(())
    }
}
