//! Error types for machinelearner.

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error: either the model name could not be resolved, or the
/// resolved estimator failed.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Delegation(#[from] DelegationError),
}

/// No namespace in the registry defines the requested model name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Model '{name}' not found in any of the searched namespaces ({})", searched.join(", "))]
pub struct ResolutionError {
    /// The model name that was requested.
    pub name: String,
    /// Namespaces searched, in priority order.
    pub searched: Vec<String>,
}

/// Failure raised by a wrapped estimator while being constructed, fitted,
/// or asked for predictions or a score.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelegationError {
    /// A keyword parameter the estimator does not accept.
    #[error("{estimator} got an unexpected parameter '{key}'")]
    UnexpectedParameter { estimator: String, key: String },

    /// A known parameter with a value of the wrong type or out of range.
    #[error("{estimator}: invalid value for parameter '{key}': {reason}")]
    InvalidParameter {
        estimator: String,
        key: String,
        reason: String,
    },

    /// `predict` or `score` was called before `fit`.
    #[error("This {estimator} instance is not fitted yet. Call 'fit' before using this estimator.")]
    NotFitted { estimator: String },

    /// Error reported by the backing implementation.
    #[error("{estimator}.{operation} failed: {message}")]
    Backend {
        estimator: String,
        operation: &'static str,
        message: String,
    },
}

impl DelegationError {
    pub fn backend(estimator: &str, operation: &'static str, err: impl std::fmt::Display) -> Self {
        DelegationError::Backend {
            estimator: estimator.to_string(),
            operation,
            message: err.to_string(),
        }
    }

    pub fn invalid(estimator: &str, key: &str, reason: impl Into<String>) -> Self {
        DelegationError::InvalidParameter {
            estimator: estimator.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_fitted(estimator: &str) -> Self {
        DelegationError::NotFitted {
            estimator: estimator.to_string(),
        }
    }
}
