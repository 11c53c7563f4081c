//! Unified error types for the Berth workspace.
//!
//! Cluster API failures are carried through unmodified; no layer in this
//! workspace retries them.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BerthError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// One or more requested services are not part of the stack.
    #[error("service(s) {} not defined in the stack", .names.join(", "))]
    UndefinedServices {
        /// Every requested name missing from the stack, in request order.
        names: Vec<String>,
    },

    /// The stack model violates one of its structural invariants.
    #[error("invalid stack '{stack}': {}", .problems.join("; "))]
    InvalidStack {
        /// Name of the offending stack.
        stack: String,
        /// One entry per detected problem.
        problems: Vec<String>,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// An object with the same identity already exists.
    #[error("{kind} '{name}' already exists in namespace '{namespace}'")]
    Conflict {
        /// Kind of the conflicting object.
        kind: &'static str,
        /// Namespace of the conflicting object.
        namespace: String,
        /// Name of the conflicting object.
        name: String,
    },

    /// The cluster API rejected or failed a request.
    #[error("cluster API error: {message}")]
    Cluster {
        /// Message reported by the cluster API.
        message: String,
    },

    /// A dependency crashed more often than its backoff limit tolerates.
    #[error("Service '{service}' has been restarted {restarts} times. Please check the logs and try again")]
    RestartLimitExceeded {
        /// The crash-looping dependency.
        service: String,
        /// Highest restart count observed among its containers.
        restarts: i32,
    },

    /// The orchestration pass was interrupted before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML serialization or deserialization failed.
    #[error("yaml error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl BerthError {
    /// Returns whether waiting on the stack must stop immediately.
    ///
    /// Cancellation and an exhausted restart budget are terminal: a polling
    /// loop built on top of the health predicates must not keep retrying them.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::RestartLimitExceeded { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BerthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_limit_message_is_user_actionable() {
        let err = BerthError::RestartLimitExceeded {
            service: "test1".into(),
            restarts: 5,
        };
        assert_eq!(
            err.to_string(),
            "Service 'test1' has been restarted 5 times. Please check the logs and try again"
        );
        assert!(err.is_terminal());
    }

    #[test]
    fn undefined_services_lists_every_name() {
        let err = BerthError::UndefinedServices {
            names: vec!["nginx".into(), "redis".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("nginx, redis"), "got: {msg}");
    }

    #[test]
    fn cluster_errors_are_not_terminal() {
        let err = BerthError::Cluster {
            message: "connection refused".into(),
        };
        assert!(!err.is_terminal());
    }
}
