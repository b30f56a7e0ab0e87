use thiserror::Error;

/// Result type alias for wafguard operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors that can occur while admitting addresses or recording retention
#[derive(Error, Debug)]
pub enum GuardError {
    /// Malformed address, timestamp or event payload
    #[error("validation failed: {0}")]
    Validation(String),

    /// The set changed between fetch and update; re-run fetch-merge-update
    #[error("conflicting update on IP set {set}: consistency token is stale")]
    Conflict {
        /// Name of the contended IP set
        set: String,
    },

    /// The store rejected the presented consistency token
    #[error("lock token mismatch on IP set {set}")]
    TokenMismatch {
        /// Name of the IP set whose token was rejected
        set: String,
    },

    /// Referenced IP set or table does not exist
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Retention ledger read or write failed
    #[error("ledger persistence failed: {0}")]
    Persistence(String),

    /// Store or telemetry backend call failed
    #[error("upstream call failed: {0}")]
    Upstream(String),

    /// Backend throttled the request
    #[error("rate limited by upstream")]
    RateLimited,

    /// Configuration is invalid or missing required fields
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`GuardError`], as seen by the invoking layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; redelivery will fail the same way
    Validation,
    /// Optimistic concurrency loss; redelivery re-runs the whole sequence
    Conflict,
    /// Missing set or table
    NotFound,
    /// Ledger write/read failure
    Persistence,
    /// Store, metrics or network failure
    TransientUpstream,
}

impl GuardError {
    /// Project this error onto the handler-facing taxonomy
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Config(_) | Self::Json(_) => ErrorKind::Validation,
            Self::Conflict { .. } | Self::TokenMismatch { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::Upstream(_) | Self::RateLimited => ErrorKind::TransientUpstream,
        }
    }

    /// Returns true if redelivering the same event may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Conflict | ErrorKind::Persistence | ErrorKind::TransientUpstream
        )
    }

    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_projection() {
        assert_eq!(
            GuardError::TokenMismatch { set: "s".into() }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(GuardError::RateLimited.kind(), ErrorKind::TransientUpstream);
        assert_eq!(
            GuardError::validation("bad ip").kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_retryable() {
        assert!(GuardError::Conflict { set: "s".into() }.is_retryable());
        assert!(GuardError::Persistence("boom".into()).is_retryable());
        assert!(!GuardError::validation("bad ip").is_retryable());
        assert!(!GuardError::NotFound {
            resource: "set".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_display() {
        let err = GuardError::Conflict {
            set: "prodBlacklistSetIPV4".into(),
        };
        assert_eq!(
            err.to_string(),
            "conflicting update on IP set prodBlacklistSetIPV4: consistency token is stale"
        );
    }
}
