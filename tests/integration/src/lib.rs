//! Integration tests for the orgbridge reconciler.
//!
//! These tests drive the real EventBridge client against a local
//! AWS-compatible server at `localhost:4566`. The Organizations API is not
//! emulated, so the account directory is a fixed in-memory list.
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p orgbridge-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use async_trait::async_trait;
use aws_sdk_eventbridge::config::{BehaviorVersion, Credentials, Region};

use orgbridge_aws::EventBridgeRouting;
use orgbridge_core::{
    AccountDirectory, AccountId, AccountPage, DirectoryError, Reconciler, ReconcilerConfig,
};

static INIT: Once = Once::new();

/// Topic ARN used as the rule target.
pub const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:000000000000:EventBridgeTopic";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("EVENTS_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Create a configured EventBridge client pointing at the local server.
#[must_use]
pub fn events_client() -> aws_sdk_eventbridge::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_eventbridge::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_eventbridge::Client::from_conf(config)
}

/// Generate a unique name for a test resource.
#[must_use]
pub fn test_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create an event bus and return its name. Caller is responsible for cleanup.
pub async fn create_test_bus(client: &aws_sdk_eventbridge::Client, prefix: &str) -> String {
    let name = test_name(prefix);
    client
        .create_event_bus()
        .name(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create event bus {name}: {e}"));
    name
}

/// Remove every rule on the bus, then delete the bus.
pub async fn cleanup_bus(client: &aws_sdk_eventbridge::Client, bus: &str) {
    if let Ok(rules) = client.list_rules().event_bus_name(bus).send().await {
        for rule in rules.rules() {
            let Some(name) = rule.name() else { continue };
            if let Ok(targets) = client
                .list_targets_by_rule()
                .rule(name)
                .event_bus_name(bus)
                .send()
                .await
            {
                let ids: Vec<String> = targets
                    .targets()
                    .iter()
                    .map(|t| t.id().to_owned())
                    .collect();
                if !ids.is_empty() {
                    let _ = client
                        .remove_targets()
                        .rule(name)
                        .event_bus_name(bus)
                        .set_ids(Some(ids))
                        .send()
                        .await;
                }
            }
            let _ = client
                .delete_rule()
                .name(name)
                .event_bus_name(bus)
                .send()
                .await;
        }
    }

    let _ = client.delete_event_bus().name(bus).send().await;
}

/// Account directory backed by a fixed list, served in pages of `page_size`.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    accounts: Vec<AccountId>,
    page_size: usize,
}

impl StaticDirectory {
    /// Create a directory over the given account IDs.
    #[must_use]
    pub fn new(accounts: &[&str], page_size: usize) -> Self {
        Self {
            accounts: accounts.iter().copied().map(AccountId::from).collect(),
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl AccountDirectory for StaticDirectory {
    async fn list_accounts_page(
        &self,
        _parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<AccountPage, DirectoryError> {
        let start = next_token.and_then(|t| t.parse().ok()).unwrap_or(0_usize);
        let end = (start + self.page_size).min(self.accounts.len());
        Ok(AccountPage {
            accounts: self.accounts.get(start..end).unwrap_or_default().to_vec(),
            next_token: (end < self.accounts.len()).then(|| end.to_string()),
        })
    }
}

/// Build a reconciler that manages `rule_name` on `bus` for `accounts`.
#[must_use]
pub fn reconciler(
    client: &aws_sdk_eventbridge::Client,
    bus: &str,
    rule_name: &str,
    accounts: &[&str],
) -> Reconciler {
    let config = ReconcilerConfig::builder()
        .organization_unit_id("ou-test-12345678")
        .sns_topic_arn(TOPIC_ARN)
        .region("us-east-1")
        .event_bus_name(bus)
        .rule_name(rule_name)
        .build();

    Reconciler::new(
        config,
        Arc::new(StaticDirectory::new(accounts, 2)),
        Arc::new(EventBridgeRouting::new(client.clone())),
    )
    .expect("valid test config")
}

mod test_reconcile;
