//! AWS SDK implementations of the orgbridge client traits.
//!
//! - [`OrganizationsDirectory`] implements [`orgbridge_core::AccountDirectory`]
//!   on top of `ListAccountsForParent`.
//! - [`EventBridgeRouting`] implements [`orgbridge_core::RoutingApi`] on top of
//!   `PutRule`, `PutTargets`, `RemoveTargets` and `DeleteRule`.
//!
//! Clients are built once per process from a shared [`aws_config::SdkConfig`]
//! (see [`load_sdk_config`]) and reused across invocations.

mod eventbridge;
mod organizations;
mod sdk;

pub use eventbridge::EventBridgeRouting;
pub use organizations::OrganizationsDirectory;
pub use sdk::load_sdk_config;
