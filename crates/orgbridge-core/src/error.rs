//! Error types for the reconciler.

use std::fmt;

/// Boxed error carried from a remote client without modification.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Configuration error raised while loading [`crate::ReconcilerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("required environment variable {0} is not set")]
    MissingVariable(&'static str),

    /// A required setting is present but empty.
    #[error("configuration value {0} must not be empty")]
    EmptyValue(&'static str),
}

/// Failure while reading the account directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The remote `ListAccountsForParent` call failed.
    #[error("failed to list accounts for parent {parent_id}")]
    Remote {
        /// The organizational unit being listed.
        parent_id: String,
        /// The underlying client error.
        #[source]
        source: BoxError,
    },
}

/// Remote EventBridge operation, used in error reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingOperation {
    /// `PutRule`.
    PutRule,
    /// `PutTargets`.
    PutTargets,
    /// `RemoveTargets`.
    RemoveTargets,
    /// `DeleteRule`.
    DeleteRule,
}

impl RoutingOperation {
    /// The API operation name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PutRule => "PutRule",
            Self::PutTargets => "PutTargets",
            Self::RemoveTargets => "RemoveTargets",
            Self::DeleteRule => "DeleteRule",
        }
    }
}

impl fmt::Display for RoutingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while mutating the remote routing configuration.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// The rule (or the bus it lives on) does not exist.
    #[error("{operation}: resource not found: {message}")]
    NotFound {
        /// The operation that was attempted.
        operation: RoutingOperation,
        /// Message reported by the remote service.
        message: String,
    },

    /// The call succeeded but some entries were rejected.
    #[error("{operation} rejected {count} entries: {details}")]
    FailedEntries {
        /// The operation that was attempted.
        operation: RoutingOperation,
        /// Number of rejected entries.
        count: usize,
        /// Error codes and messages of the rejected entries.
        details: String,
    },

    /// Any other remote failure (transport, auth, throttling, validation).
    #[error("{operation} failed")]
    Remote {
        /// The operation that was attempted.
        operation: RoutingOperation,
        /// The underlying client error.
        #[source]
        source: BoxError,
    },
}

impl RoutingError {
    /// Whether this error reports a missing rule or target.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The operation that produced this error.
    #[must_use]
    pub fn operation(&self) -> RoutingOperation {
        match self {
            Self::NotFound { operation, .. }
            | Self::FailedEntries { operation, .. }
            | Self::Remote { operation, .. } => *operation,
        }
    }
}

/// Top-level error for a single invocation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Enumerating the organizational unit failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Converging the routing rule failed.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The event pattern could not be serialized.
    #[error("failed to serialize event pattern: {0}")]
    Pattern(#[from] serde_json::Error),
}

impl ReconcileError {
    /// Short error type name reported to the invocation framework.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Directory(_) => "DirectoryError",
            Self::Routing(_) => "RoutingError",
            Self::Pattern(_) => "PatternError",
        }
    }
}

/// Convenience result type for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
