//! Desired rule synthesis.
//!
//! The desired rule is a pure function of the current account list: the event
//! pattern matches the fixed set of event sources coming from exactly those
//! accounts. An empty account list means no rule should exist at all, since
//! EventBridge rejects an empty `account` array.

use serde::{Deserialize, Serialize};

use crate::types::AccountId;

/// Default name of the managed rule.
pub const DEFAULT_RULE_NAME: &str = "CentralEventBridgeRule";

/// Description attached to the managed rule.
pub const RULE_DESCRIPTION: &str = "The Rule propagates all Amazon CloudWatch Events, AWS Config Events, AWS Guardduty Events to the eventbus";

/// Event sources forwarded by the managed rule.
pub const RULE_SOURCES: [&str; 3] = ["aws.cloudwatch", "aws.config", "aws.guardduty"];

/// Target ID used for the rule's single SNS target.
#[must_use]
pub fn target_id_for(rule_name: &str) -> String {
    format!("snsTarget-{rule_name}")
}

/// EventBridge event pattern matching `source` events from `account`.
///
/// Field order is kept so the serialized pattern is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPattern {
    /// Accounts the events must originate from, in directory order.
    pub account: Vec<AccountId>,
    /// Event sources to match.
    pub source: Vec<String>,
}

/// The full desired state of the managed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    /// Rule name.
    pub name: String,
    /// Rule description.
    pub description: String,
    /// Event pattern.
    pub event_pattern: EventPattern,
}

impl RuleDefinition {
    /// Event sources matched by the rule.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.event_pattern.source
    }

    /// Accounts matched by the rule.
    #[must_use]
    pub fn accounts(&self) -> &[AccountId] {
        &self.event_pattern.account
    }

    /// The event pattern as the JSON document `PutRule` expects.
    pub fn event_pattern_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.event_pattern)
    }
}

/// Static part of the rule: everything except the account list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    /// Rule name.
    pub name: String,
    /// Rule description.
    pub description: String,
    /// Event sources, in order.
    pub sources: Vec<String>,
}

impl RuleTemplate {
    /// Create the standard template under the given rule name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: RULE_DESCRIPTION.to_owned(),
            sources: RULE_SOURCES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// ID of the rule's SNS target.
    #[must_use]
    pub fn target_id(&self) -> String {
        target_id_for(&self.name)
    }

    /// Build the desired rule for the given accounts.
    ///
    /// Returns `None` when `accounts` is empty: no rule is needed and the
    /// caller must not create one.
    #[must_use]
    pub fn build_pattern(&self, accounts: &[AccountId]) -> Option<RuleDefinition> {
        if accounts.is_empty() {
            return None;
        }
        Some(RuleDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            event_pattern: EventPattern {
                account: accounts.to_vec(),
                source: self.sources.clone(),
            },
        })
    }
}

impl Default for RuleTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_RULE_NAME)
    }
}
