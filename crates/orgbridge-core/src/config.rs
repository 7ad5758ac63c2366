//! Reconciler configuration.
//!
//! Provides [`ReconcilerConfig`], loaded once at startup from the Lambda
//! environment and handed to the [`crate::Reconciler`]. Unlike the optional
//! settings, the organizational unit, topic, region and bus are required: a
//! missing value fails startup instead of flowing into API calls.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::ConfigError;
use crate::pattern::{DEFAULT_RULE_NAME, RuleTemplate};

/// Reconciler configuration.
///
/// # Examples
///
/// ```
/// use orgbridge_core::ReconcilerConfig;
///
/// let config = ReconcilerConfig::builder()
///     .organization_unit_id("ou-abcd-12345678")
///     .sns_topic_arn("arn:aws:sns:eu-west-1:123456789012:EventBridgeTopic")
///     .region("eu-west-1")
///     .event_bus_name("CentralEventBus")
///     .build();
/// assert_eq!(config.rule_name, "CentralEventBridgeRule");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilerConfig {
    /// Organizational unit whose member accounts feed the rule.
    #[builder(setter(into))]
    pub organization_unit_id: String,

    /// ARN of the SNS topic the rule forwards to.
    #[builder(setter(into))]
    pub sns_topic_arn: String,

    /// AWS region of the event bus.
    #[builder(setter(into))]
    pub region: String,

    /// Name of the central event bus.
    #[builder(setter(into))]
    pub event_bus_name: String,

    /// Name of the managed rule.
    #[builder(default = String::from(DEFAULT_RULE_NAME), setter(into))]
    pub rule_name: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"), setter(into))]
    pub log_level: String,
}

impl ReconcilerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `ORGANIZATION_UNIT_ID` | *(required)* |
    /// | `SNS_TOPIC_ARN` | *(required)* |
    /// | `REGION` | *(required)* |
    /// | `EVENT_BUS_NAME` | *(required)* |
    /// | `CENTRAL_EVENT_BRIDGE_RULE_NAME` | `CentralEventBridgeRule` |
    /// | `LOG_LEVEL` | `info` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingVariable(key));

        let mut config = Self::builder()
            .organization_unit_id(required("ORGANIZATION_UNIT_ID")?)
            .sns_topic_arn(required("SNS_TOPIC_ARN")?)
            .region(required("REGION")?)
            .event_bus_name(required("EVENT_BUS_NAME")?)
            .build();

        if let Some(v) = lookup("CENTRAL_EVENT_BRIDGE_RULE_NAME").filter(|v| !v.is_empty()) {
            config.rule_name = v;
        }
        if let Some(v) = lookup("LOG_LEVEL").filter(|v| !v.is_empty()) {
            config.log_level = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every required value is non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("ORGANIZATION_UNIT_ID", &self.organization_unit_id),
            ("SNS_TOPIC_ARN", &self.sns_topic_arn),
            ("REGION", &self.region),
            ("EVENT_BUS_NAME", &self.event_bus_name),
            ("CENTRAL_EVENT_BRIDGE_RULE_NAME", &self.rule_name),
        ];
        match fields.into_iter().find(|(_, v)| v.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::EmptyValue(name)),
            None => Ok(()),
        }
    }

    /// The rule template for the configured rule name.
    #[must_use]
    pub fn template(&self) -> RuleTemplate {
        RuleTemplate::new(&self.rule_name)
    }
}
