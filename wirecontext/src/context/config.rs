//! Construction settings for [`Context`](super::Context).

use crate::cancellation::CancelSignal;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Configuration used to create a new context.
///
/// The default configuration derives from a fresh background signal, so
/// `Context::new(ContextConfig::default())` never fails.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Parent cancellation signal. Required.
    pub parent: Option<CancelSignal>,
    /// Relative timeout applied on top of the parent's deadline.
    pub timeout: Option<Duration>,
    /// Absolute deadline applied on top of the parent's deadline.
    pub deadline: Option<DateTime<Utc>>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            parent: Some(CancelSignal::background()),
            timeout: None,
            deadline: None,
        }
    }
}

impl ContextConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration without a parent signal.
    ///
    /// Passing it to `Context::new` fails with `InvalidConfig`; callers that
    /// build configs field by field start from here.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            parent: None,
            timeout: None,
            deadline: None,
        }
    }

    /// Sets the parent signal.
    #[must_use]
    pub fn with_parent(mut self, parent: CancelSignal) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets a relative timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the earlier of the absolute deadline and `now + timeout`.
    ///
    /// A timeout too large to represent is ignored.
    #[must_use]
    pub fn effective_deadline(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let from_timeout = self
            .timeout
            .and_then(|timeout| chrono::Duration::from_std(timeout).ok())
            .and_then(|delta| now.checked_add_signed(delta));

        match (self.deadline, from_timeout) {
            (Some(deadline), Some(expiry)) => Some(deadline.min(expiry)),
            (deadline, expiry) => deadline.or(expiry),
        }
    }
}
