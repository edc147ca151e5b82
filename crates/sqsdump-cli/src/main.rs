use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sqsdump::{Drainer, QueueConfig, SqsClient, StopPolicy};
use tokio::sync::watch;

mod aws;
mod dump;
mod envelope;
mod path;

use dump::DumpHandler;

#[tokio::main]
pub async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = Cli::parse().run().await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, Parser)]
#[command(name = "sqsdump", version)]
#[command(about = "dump (and optionally delete) the messages of an AWS SQS queue", long_about = None)]
pub struct Cli {
    /// The source queue
    #[arg(short = 's', long, env = "SQSDUMP_QUEUE_NAME")]
    queue_name: String,

    /// Delete received messages once they are printed
    #[arg(long)]
    delete_message: bool,

    /// Print message bodies as received, without unwrapping SNS notifications
    #[arg(long)]
    raw: bool,

    /// JSON path into the notification payload, like x.y or items[0].id
    #[arg(long, visible_alias = "jp")]
    json_path: Option<String>,

    /// Stop when all messages advertised by the queue at startup are processed
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    stop_on_total: bool,

    /// Stop after this many distinct messages (takes precedence over --stop-on-total)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    stop_after: Option<u64>,

    /// Messages requested per receive call
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(i32).range(1..=10))]
    max_messages: i32,

    /// Long-poll wait per receive call, in seconds
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(i32).range(0..=20))]
    wait_time: i32,

    #[command(flatten)]
    aws: aws::AwsArgs,
}

impl Cli {
    fn stop_policy(&self) -> StopPolicy {
        match self.stop_after {
            Some(count) => StopPolicy::DistinctCount(count),
            None if self.stop_on_total => StopPolicy::AdvertisedTotal,
            None => StopPolicy::Never,
        }
    }

    fn queue_config(&self) -> QueueConfig {
        QueueConfig::new(self.queue_name.as_str())
            .with_max_messages(self.max_messages)
            .with_wait_time(self.wait_time)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let policy = self.stop_policy();
        let client = SqsClient::from_config(self.aws.load().await);

        let drainer = Drainer::new(client, self.queue_config(), policy)
            .await
            .context("error creating SQS drainer")?;
        let bar = progress_bar(policy, drainer.advertised_total());
        let mut drainer = drainer.with_progress(bar);

        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("received Ctrl+C, finishing the current batch");
                let _ = stop_tx.send(true);
            }
        });

        let handler = DumpHandler::new(self.delete_message, self.raw, self.json_path);
        log::info!("started processing");

        let outcome = drainer.drain(stop_rx, Some(&handler)).await?;
        log::info!(
            "=== {:?}: processed {} distinct messages of ~{} advertised",
            outcome,
            drainer.distinct_processed(),
            drainer.advertised_total()
        );

        Ok(())
    }
}

fn progress_bar(policy: StopPolicy, advertised_total: u64) -> ProgressBar {
    let len = match policy {
        StopPolicy::DistinctCount(count) => count,
        StopPolicy::AdvertisedTotal => advertised_total,
        StopPolicy::Never => return ProgressBar::new_spinner(),
    };

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} messages")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
