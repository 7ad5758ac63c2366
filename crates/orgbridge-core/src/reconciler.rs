//! Event dispatch and rule reconciliation.
//!
//! [`Reconciler`] owns the injected clients and the configuration. Every
//! invocation derives the desired rule from a fresh account listing; nothing
//! is cached between invocations.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::ReconcilerConfig;
use crate::directory::{AccountDirectory, list_accounts};
use crate::error::{ConfigError, ReconcileResult};
use crate::event::{InboundEvent, RequestType, TriggerEvent};
use crate::pattern::RuleTemplate;
use crate::response::HandlerResponse;
use crate::routing::{RoutingApi, RuleConverger};
use crate::types::AccountId;

/// An action taken during one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The rule and its target were put for this many accounts.
    RuleUpserted {
        /// Number of accounts in the pattern.
        accounts: usize,
    },
    /// The unit has no accounts, so no rule was put.
    RuleSkipped,
    /// The rule and its target were removed.
    RuleRemoved,
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Actions in the order they were applied.
    pub actions: Vec<Action>,
    /// Number of accounts enumerated, if enumeration happened.
    pub account_count: Option<usize>,
}

/// Keeps the central rule in sync with the organizational unit.
pub struct Reconciler {
    config: ReconcilerConfig,
    template: RuleTemplate,
    directory: Arc<dyn AccountDirectory>,
    converger: RuleConverger,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("converger", &self.converger)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create a reconciler, validating the configuration up front.
    pub fn new(
        config: ReconcilerConfig,
        directory: Arc<dyn AccountDirectory>,
        routing: Arc<dyn RoutingApi>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let template = config.template();
        let converger = RuleConverger::new(routing, config.event_bus_name.clone());
        Ok(Self {
            config,
            template,
            directory,
            converger,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Handle a raw event payload and build the response.
    pub async fn handle(&self, payload: &Value) -> ReconcileResult<HandlerResponse> {
        debug!(event = %payload, "received event");
        let event = InboundEvent::from_value(payload);
        let outcome = self.dispatch(&event).await?;
        Ok(HandlerResponse::new(&event, &outcome, &self.template.name))
    }

    /// Apply every trigger carried by `event`.
    ///
    /// The lifecycle request is handled first, then the membership change.
    /// Both checks always run. The account list is fetched at most once.
    pub async fn dispatch(&self, event: &InboundEvent) -> ReconcileResult<Outcome> {
        let mut run = Run::default();

        for trigger in event.triggers() {
            match trigger {
                TriggerEvent::Lifecycle(request_type) => {
                    info!(request_type = %request_type, "handling custom resource request");
                    match request_type {
                        RequestType::Create => self.sync_rule(&mut run).await?,
                        RequestType::Update => {
                            // Update tears the rule down right after refreshing it.
                            // This is what the deployed handler has always done; see
                            // DESIGN.md before changing it.
                            self.sync_rule(&mut run).await?;
                            self.remove_rule(&mut run).await?;
                        }
                        RequestType::Delete => self.remove_rule(&mut run).await?,
                    }
                }
                TriggerEvent::MembershipChange(change) => {
                    info!(event_name = %change, "handling organization membership change");
                    self.sync_rule(&mut run).await?;
                }
            }
        }

        if run.outcome.actions.is_empty() {
            debug!(
                request_type = ?event.request_type,
                event_name = ?event.event_name,
                "event matched no trigger, nothing to do"
            );
        }
        Ok(run.outcome)
    }

    /// Enumerate the unit (once per run) and put the rule for its accounts.
    async fn sync_rule(&self, run: &mut Run) -> ReconcileResult<()> {
        let accounts = match run.accounts.take() {
            Some(accounts) => accounts,
            None => {
                list_accounts(self.directory.as_ref(), &self.config.organization_unit_id).await?
            }
        };
        run.outcome.account_count = Some(accounts.len());

        let result = match self.template.build_pattern(&accounts) {
            Some(definition) => self
                .converger
                .upsert_rule(&definition, &self.config.sns_topic_arn)
                .await
                .map(|_| Action::RuleUpserted {
                    accounts: accounts.len(),
                }),
            None => {
                info!(
                    organization_unit_id = %self.config.organization_unit_id,
                    "organizational unit has no accounts, skipping rule"
                );
                Ok(Action::RuleSkipped)
            }
        };

        run.accounts = Some(accounts);
        run.outcome.actions.push(result?);
        Ok(())
    }

    async fn remove_rule(&self, run: &mut Run) -> ReconcileResult<()> {
        self.converger.remove_rule(&self.template.name).await?;
        run.outcome.actions.push(Action::RuleRemoved);
        Ok(())
    }
}

/// Per-invocation scratch state.
#[derive(Debug, Default)]
struct Run {
    accounts: Option<Vec<AccountId>>,
    outcome: Outcome,
}
