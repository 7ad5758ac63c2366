//! Shared SDK configuration.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Load the SDK configuration for `region` from the default provider chain.
///
/// Credentials come from the Lambda execution role; `AWS_ENDPOINT_URL` and
/// the other standard SDK variables are honored.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    debug!(region, "loading AWS SDK configuration");
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_owned()))
        .load()
        .await
}
