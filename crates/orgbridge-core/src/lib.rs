//! Core reconciliation logic for the organization EventBridge setup.
//!
//! This crate keeps a central EventBridge rule in sync with the member
//! accounts of an organizational unit. It is driven by two kinds of inbound
//! events: CloudFormation custom-resource lifecycle requests and CloudTrail
//! `MoveAccount` / `RemoveAccountFromOrganization` notifications.
//!
//! The remote services sit behind two traits, [`AccountDirectory`] and
//! [`RoutingApi`], so the reconciler can run against AWS (see the
//! `orgbridge-aws` crate) or against an in-memory fake in tests.
//!
//! # Flow
//!
//! ```text
//! event ──> Reconciler::handle
//!             ├─ list_accounts   (paginated ListAccountsForParent)
//!             ├─ RuleTemplate::build_pattern
//!             └─ RuleConverger::{upsert_rule, remove_rule}
//! ```

mod config;
mod directory;
mod error;
mod event;
mod pattern;
mod reconciler;
mod response;
mod routing;
mod types;


pub use config::ReconcilerConfig;
pub use directory::{AccountDirectory, AccountPage, list_accounts};
pub use error::{
    BoxError, ConfigError, DirectoryError, ReconcileError, ReconcileResult, RoutingError,
    RoutingOperation,
};
pub use event::{
    InboundEvent, MembershipChange, ParseRequestTypeError, RequestType, TriggerEvent,
};
pub use pattern::{
    DEFAULT_RULE_NAME, EventPattern, RULE_DESCRIPTION, RULE_SOURCES, RuleDefinition,
    RuleTemplate, target_id_for,
};
pub use reconciler::{Action, Outcome, Reconciler};
pub use response::HandlerResponse;
pub use routing::{RoutingApi, RuleConverger, Target};
pub use types::AccountId;
