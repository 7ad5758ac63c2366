//! Rule convergence against the remote routing API.
//!
//! [`RoutingApi`] mirrors the four EventBridge calls the reconciler needs.
//! [`RuleConverger`] sequences them: a rule is always put before its target is
//! attached, and its target is always removed before the rule is deleted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ReconcileResult, RoutingError};
use crate::pattern::{RuleDefinition, target_id_for};

/// A rule target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Rule the target is attached to.
    pub rule_name: String,
    /// Target ID, unique within the rule.
    pub target_id: String,
    /// ARN of the destination.
    pub destination_arn: String,
}

/// Mutating access to the EventBridge rules of one account and region.
#[async_trait]
pub trait RoutingApi: Send + Sync {
    /// Create or replace a rule on `event_bus`.
    async fn put_rule(
        &self,
        name: &str,
        description: &str,
        event_bus: &str,
        event_pattern: &str,
    ) -> Result<(), RoutingError>;

    /// Create or replace a single target of a rule.
    async fn put_target(&self, event_bus: &str, target: &Target) -> Result<(), RoutingError>;

    /// Remove targets from a rule.
    async fn remove_targets(
        &self,
        rule_name: &str,
        event_bus: &str,
        target_ids: &[String],
    ) -> Result<(), RoutingError>;

    /// Delete a rule. The rule must have no targets left.
    async fn delete_rule(&self, name: &str, event_bus: &str) -> Result<(), RoutingError>;
}

/// Converges the managed rule on one event bus.
#[derive(Clone)]
pub struct RuleConverger {
    routing: Arc<dyn RoutingApi>,
    event_bus: String,
}

impl std::fmt::Debug for RuleConverger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleConverger")
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

impl RuleConverger {
    /// Create a converger for `event_bus`.
    #[must_use]
    pub fn new(routing: Arc<dyn RoutingApi>, event_bus: impl Into<String>) -> Self {
        Self {
            routing,
            event_bus: event_bus.into(),
        }
    }

    /// The event bus this converger manages.
    #[must_use]
    pub fn event_bus(&self) -> &str {
        &self.event_bus
    }

    /// Put the rule, then point its single target at `destination_arn`.
    ///
    /// If the target call fails the rule is left without a target; the next
    /// successful invocation repairs it.
    pub async fn upsert_rule(
        &self,
        definition: &RuleDefinition,
        destination_arn: &str,
    ) -> ReconcileResult<Target> {
        let pattern = definition.event_pattern_json()?;

        debug!(rule = %definition.name, event_bus = %self.event_bus, %pattern, "putting rule");
        self.routing
            .put_rule(
                &definition.name,
                &definition.description,
                &self.event_bus,
                &pattern,
            )
            .await?;

        let target = Target {
            rule_name: definition.name.clone(),
            target_id: target_id_for(&definition.name),
            destination_arn: destination_arn.to_owned(),
        };
        debug!(rule = %target.rule_name, target_id = %target.target_id, "putting rule target");
        self.routing.put_target(&self.event_bus, &target).await?;

        info!(
            rule = %definition.name,
            event_bus = %self.event_bus,
            accounts = definition.accounts().len(),
            "rule converged"
        );
        Ok(target)
    }

    /// Remove the rule's target, then delete the rule.
    ///
    /// A missing rule or target is not an error, so teardown can be repeated.
    pub async fn remove_rule(&self, rule_name: &str) -> Result<(), RoutingError> {
        let target_ids = [target_id_for(rule_name)];

        match self
            .routing
            .remove_targets(rule_name, &self.event_bus, &target_ids)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(rule = rule_name, error = %e, "no target to remove");
            }
            Err(e) => return Err(e),
        }

        match self.routing.delete_rule(rule_name, &self.event_bus).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(rule = rule_name, error = %e, "rule already deleted");
            }
            Err(e) => return Err(e),
        }

        info!(rule = rule_name, event_bus = %self.event_bus, "rule removed");
        Ok(())
    }
}
