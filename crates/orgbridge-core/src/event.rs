//! Inbound event classification.
//!
//! Two event shapes reach the handler:
//!
//! - CloudFormation custom-resource requests: `{"RequestType": "Create" | "Update" | "Delete", ...}`
//! - CloudTrail-via-EventBridge notifications: `{"detail": {"eventName": "MoveAccount", ...}, ...}`
//!
//! Both are checked on every invocation. Anything else is not an error; it
//! simply produces no trigger.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// CloudFormation custom-resource request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// The custom resource is being created.
    Create,
    /// The custom resource is being updated.
    Update,
    /// The custom resource is being deleted.
    Delete,
}

impl RequestType {
    /// The wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

/// Error returned when parsing a [`RequestType`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request type: {0}")]
pub struct ParseRequestTypeError(String);

impl FromStr for RequestType {
    type Err = ParseRequestTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(ParseRequestTypeError(other.to_owned())),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization API calls that change the unit's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipChange {
    /// An account was moved into or out of an organizational unit.
    MoveAccount,
    /// An account left the organization.
    RemoveAccountFromOrganization,
}

impl MembershipChange {
    /// The CloudTrail event name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MoveAccount => "MoveAccount",
            Self::RemoveAccountFromOrganization => "RemoveAccountFromOrganization",
        }
    }

    /// Match a CloudTrail event name.
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "MoveAccount" => Some(Self::MoveAccount),
            "RemoveAccountFromOrganization" => Some(Self::RemoveAccountFromOrganization),
            _ => None,
        }
    }
}

impl fmt::Display for MembershipChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A custom-resource lifecycle request.
    Lifecycle(RequestType),
    /// An organization membership change notification.
    MembershipChange(MembershipChange),
}

/// The fields of an inbound event the reconciler looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    /// `RequestType`, verbatim.
    pub request_type: Option<String>,
    /// `PhysicalResourceId` of an existing custom resource.
    pub physical_resource_id: Option<String>,
    /// `detail.eventName`, verbatim.
    pub event_name: Option<String>,
}

impl InboundEvent {
    /// Extract the relevant fields from a raw event payload.
    ///
    /// Fields with an unexpected JSON type are treated as absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let string_at = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        };

        Self {
            request_type: string_at("/RequestType"),
            physical_resource_id: string_at("/PhysicalResourceId"),
            event_name: string_at("/detail/eventName"),
        }
    }

    /// The lifecycle request type, if this is a recognized custom-resource request.
    #[must_use]
    pub fn lifecycle(&self) -> Option<RequestType> {
        self.request_type.as_deref()?.parse().ok()
    }

    /// The membership change, if this is a recognized organization event.
    #[must_use]
    pub fn membership_change(&self) -> Option<MembershipChange> {
        MembershipChange::from_event_name(self.event_name.as_deref()?)
    }

    /// All triggers carried by this event, lifecycle first.
    #[must_use]
    pub fn triggers(&self) -> Vec<TriggerEvent> {
        self.lifecycle()
            .map(TriggerEvent::Lifecycle)
            .into_iter()
            .chain(self.membership_change().map(TriggerEvent::MembershipChange))
            .collect()
    }
}
