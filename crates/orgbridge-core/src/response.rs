//! Handler response returned to the invoking framework.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::event::InboundEvent;
use crate::reconciler::Outcome;

/// Response body of one invocation.
///
/// For custom-resource requests this is the shape the CloudFormation
/// provider framework expects from its `onEvent` handler. The physical
/// resource ID stays stable across updates so the resource is never replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HandlerResponse {
    /// Physical ID of the custom resource; only set for lifecycle requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// Attributes exposed to the stack.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl HandlerResponse {
    /// Build the response for `event` after it produced `outcome`.
    #[must_use]
    pub fn new(event: &InboundEvent, outcome: &Outcome, rule_name: &str) -> Self {
        if outcome.actions.is_empty() {
            return Self::default();
        }

        let physical_resource_id = event.lifecycle().map(|_| {
            event
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| rule_name.to_owned())
        });

        let mut data = BTreeMap::new();
        data.insert("RuleName".to_owned(), rule_name.to_owned());
        if let Some(count) = outcome.account_count {
            data.insert("AccountCount".to_owned(), count.to_string());
        }

        Self {
            physical_resource_id,
            data,
        }
    }
}
