use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::config::Credentials;

pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Set to any non-empty value to target LocalStack without passing `--local`.
const LOCALSTACK_ENV: &str = "localstack";

#[derive(Debug, clap::Args)]
pub struct AwsArgs {
    /// Use LocalStack with static test credentials
    #[arg(long)]
    pub local: bool,

    /// Override the SQS endpoint (defaults to http://localhost:4566 with --local)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// AWS region; falls back to the environment, then us-east-1
    #[arg(long)]
    pub region: Option<String>,

    /// Attempts per AWS request, retries included
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,
}

impl AwsArgs {
    pub fn use_localstack(&self) -> bool {
        self.local || std::env::var_os(LOCALSTACK_ENV).is_some_and(|v| !v.is_empty())
    }

    pub fn endpoint(&self) -> Option<&str> {
        match (&self.endpoint, self.use_localstack()) {
            (Some(endpoint), _) => Some(endpoint),
            (None, true) => Some(LOCALSTACK_ENDPOINT),
            (None, false) => None,
        }
    }

    pub async fn load(&self) -> aws_config::SdkConfig {
        let region = RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::from_static("us-east-1"));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .retry_config(RetryConfig::standard().with_max_attempts(self.max_attempts));

        if self.use_localstack() {
            log::info!("loading local config");
            loader = loader.credentials_provider(Credentials::new(
                "test", "test", None, None, "static",
            ));
        }
        if let Some(endpoint) = self.endpoint() {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }
}
