//! Error types for wirecontext.
//!
//! Every fallible operation returns [`ContextError`]. Errors are always
//! handed back to the caller; nothing in this crate retries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ContextError> = std::result::Result<T, E>;

/// The main error type for context operations.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A constructor was given a missing or invalid setting.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A field required by the operation is absent.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// An equality-reduced field disagrees across merge sources.
    #[error("{0}")]
    InconsistentMerge(#[from] InconsistentMergeError),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The context was cancelled or its deadline passed.
    #[error("{0}")]
    Cancelled(#[from] CancelError),
}

impl ContextError {
    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates an invalid context error.
    #[must_use]
    pub fn invalid_context(message: impl Into<String>) -> Self {
        Self::InvalidContext(message.into())
    }

    /// Returns true for [`ContextError::InvalidConfig`].
    #[must_use]
    pub const fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Returns true for [`ContextError::InvalidContext`].
    #[must_use]
    pub const fn is_invalid_context(&self) -> bool {
        matches!(self, Self::InvalidContext(_))
    }

    /// Returns true for [`ContextError::InconsistentMerge`].
    #[must_use]
    pub const fn is_inconsistent_merge(&self) -> bool {
        matches!(self, Self::InconsistentMerge(_))
    }

    /// Converts to a dictionary representation suitable for structured logs.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        let kind = match self {
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::InvalidContext(_) => "InvalidContext",
            Self::InconsistentMerge(err) => {
                map.insert("key".to_string(), serde_json::json!(err.key));
                map.insert("source_index".to_string(), serde_json::json!(err.source_index));
                "InconsistentMerge"
            }
            Self::Serialization(_) => "Serialization",
            Self::Cancelled(_) => "Cancelled",
        };

        map.insert("type".to_string(), serde_json::json!(kind));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Raised when an equality-reduced field differs between merge sources.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("inconsistent merge: '{key}' of source {source_index} differs from source 0")]
pub struct InconsistentMergeError {
    /// The key of the diverging field.
    pub key: String,
    /// Position of the first source that disagreed with the reference.
    pub source_index: usize,
}

impl InconsistentMergeError {
    /// Creates a new inconsistent merge error.
    #[must_use]
    pub fn new(key: impl Into<String>, source_index: usize) -> Self {
        Self {
            key: key.into(),
            source_index,
        }
    }
}

/// Why a cancellation signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum CancelError {
    /// The signal, or one of its ancestors, was cancelled explicitly.
    #[error("context canceled")]
    Canceled,

    /// The signal's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}
