//! EventBridge-backed routing API.

use std::fmt;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_eventbridge::error::{DisplayErrorContext, SdkError};
use aws_sdk_eventbridge::operation::delete_rule::DeleteRuleError;
use aws_sdk_eventbridge::operation::put_rule::PutRuleError;
use aws_sdk_eventbridge::operation::put_targets::PutTargetsError;
use aws_sdk_eventbridge::operation::remove_targets::RemoveTargetsError;
use aws_sdk_eventbridge::types::Target as SdkTarget;
use tracing::debug;

use orgbridge_core::{RoutingApi, RoutingError, RoutingOperation, Target};

/// Manages rules and targets through the EventBridge API.
#[derive(Debug, Clone)]
pub struct EventBridgeRouting {
    client: aws_sdk_eventbridge::Client,
}

impl EventBridgeRouting {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: aws_sdk_eventbridge::Client) -> Self {
        Self { client }
    }

    /// Build a client from shared SDK configuration.
    #[must_use]
    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_eventbridge::Client::new(config))
    }
}

#[async_trait]
impl RoutingApi for EventBridgeRouting {
    async fn put_rule(
        &self,
        name: &str,
        description: &str,
        event_bus: &str,
        event_pattern: &str,
    ) -> Result<(), RoutingError> {
        let output = self
            .client
            .put_rule()
            .name(name)
            .description(description)
            .event_bus_name(event_bus)
            .event_pattern(event_pattern)
            .send()
            .await
            .map_err(|e| {
                routing_error(
                    RoutingOperation::PutRule,
                    e,
                    PutRuleError::is_resource_not_found_exception,
                )
            })?;
        debug!(rule = name, rule_arn = ?output.rule_arn(), "PutRule");
        Ok(())
    }

    async fn put_target(&self, event_bus: &str, target: &Target) -> Result<(), RoutingError> {
        let operation = RoutingOperation::PutTargets;
        let sdk_target = SdkTarget::builder()
            .id(&target.target_id)
            .arn(&target.destination_arn)
            .build()
            .map_err(|e| RoutingError::Remote {
                operation,
                source: Box::new(e),
            })?;

        let output = self
            .client
            .put_targets()
            .rule(&target.rule_name)
            .event_bus_name(event_bus)
            .targets(sdk_target)
            .send()
            .await
            .map_err(|e| {
                routing_error(
                    operation,
                    e,
                    PutTargetsError::is_resource_not_found_exception,
                )
            })?;
        debug!(rule = %target.rule_name, target_id = %target.target_id, "PutTargets");

        check_entries(
            operation,
            output.failed_entries().iter().map(|e| FailedEntry {
                target_id: e.target_id(),
                code: e.error_code(),
                message: e.error_message(),
            }),
        )
    }

    async fn remove_targets(
        &self,
        rule_name: &str,
        event_bus: &str,
        target_ids: &[String],
    ) -> Result<(), RoutingError> {
        let operation = RoutingOperation::RemoveTargets;
        let output = self
            .client
            .remove_targets()
            .rule(rule_name)
            .event_bus_name(event_bus)
            .set_ids(Some(target_ids.to_vec()))
            .send()
            .await
            .map_err(|e| {
                routing_error(
                    operation,
                    e,
                    RemoveTargetsError::is_resource_not_found_exception,
                )
            })?;
        debug!(rule = rule_name, ?target_ids, "RemoveTargets");

        check_entries(
            operation,
            output.failed_entries().iter().map(|e| FailedEntry {
                target_id: e.target_id(),
                code: e.error_code(),
                message: e.error_message(),
            }),
        )
    }

    async fn delete_rule(&self, name: &str, event_bus: &str) -> Result<(), RoutingError> {
        self.client
            .delete_rule()
            .name(name)
            .event_bus_name(event_bus)
            .send()
            .await
            .map_err(|e| {
                routing_error(
                    RoutingOperation::DeleteRule,
                    e,
                    DeleteRuleError::is_resource_not_found_exception,
                )
            })?;
        debug!(rule = name, "DeleteRule");
        Ok(())
    }
}

/// Map an SDK error, splitting out `ResourceNotFoundException`.
fn routing_error<E, R>(
    operation: RoutingOperation,
    err: SdkError<E, R>,
    is_not_found: impl FnOnce(&E) -> bool,
) -> RoutingError
where
    E: std::error::Error + Send + Sync + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    if err.as_service_error().is_some_and(is_not_found) {
        return RoutingError::NotFound {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        };
    }
    RoutingError::Remote {
        operation,
        source: Box::new(err),
    }
}

/// A per-target failure reported inside a successful response.
#[derive(Debug)]
struct FailedEntry<'a> {
    target_id: Option<&'a str>,
    code: Option<&'a str>,
    message: Option<&'a str>,
}

impl fmt::Display for FailedEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.target_id.unwrap_or("<unknown>"),
            self.code.unwrap_or("UnknownError"),
            self.message.unwrap_or_default()
        )
    }
}

/// Turn rejected entries into an error.
///
/// When every rejection is a not-found code the whole call is reported as
/// [`RoutingError::NotFound`], so removing an absent target stays idempotent.
fn check_entries<'a>(
    operation: RoutingOperation,
    entries: impl IntoIterator<Item = FailedEntry<'a>>,
) -> Result<(), RoutingError> {
    let entries: Vec<FailedEntry<'a>> = entries.into_iter().collect();
    if entries.is_empty() {
        return Ok(());
    }

    let details = entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    if entries
        .iter()
        .all(|e| e.code.is_some_and(|c| c.contains("NotFound")))
    {
        return Err(RoutingError::NotFound {
            operation,
            message: details,
        });
    }

    Err(RoutingError::FailedEntries {
        operation,
        count: entries.len(),
        details,
    })
}
