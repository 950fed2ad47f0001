//! Structured tracing of merge operations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Span attributes for one merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeSpanAttributes {
    /// Merge mode (`lenient` or `strict`).
    pub mode: String,
    /// Number of source contexts.
    pub source_count: usize,
    /// Number of fields in the descriptor.
    pub field_count: usize,
    /// Key of the field that failed, if any.
    pub failed_key: Option<String>,
    /// Session id shared by the sources, if known.
    pub session_id: Option<String>,
}

impl MergeSpanAttributes {
    /// Creates new merge span attributes.
    #[must_use]
    pub fn new(mode: impl Into<String>, source_count: usize, field_count: usize) -> Self {
        Self {
            mode: mode.into(),
            source_count,
            field_count,
            ..Default::default()
        }
    }

    /// Sets the failing field.
    #[must_use]
    pub fn with_failed_key(mut self, key: impl Into<String>) -> Self {
        self.failed_key = Some(key.into());
        self
    }

    /// Sets the session id.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Converts to flat key/value attributes.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("merge.mode".to_string(), self.mode.clone());
        attrs.insert("merge.source_count".to_string(), self.source_count.to_string());
        attrs.insert("merge.field_count".to_string(), self.field_count.to_string());
        if let Some(ref v) = self.failed_key {
            attrs.insert("merge.failed_key".to_string(), v.clone());
        }
        if let Some(ref v) = self.session_id {
            attrs.insert("session.id".to_string(), v.clone());
        }

        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Receives notifications about merges.
pub trait MergeObserver: Send + Sync {
    /// Called before any field is reduced.
    fn merge_started(&self, attributes: &MergeSpanAttributes);

    /// Called after the staged result was committed to the target.
    fn merge_committed(&self, attributes: &MergeSpanAttributes, duration_ms: f64);

    /// Called when a reducer rejected the sources.
    fn merge_failed(&self, attributes: &MergeSpanAttributes, error: &str);
}

/// Observer that discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMergeObserver;

impl MergeObserver for NoOpMergeObserver {
    fn merge_started(&self, _attributes: &MergeSpanAttributes) {}
    fn merge_committed(&self, _attributes: &MergeSpanAttributes, _duration_ms: f64) {}
    fn merge_failed(&self, _attributes: &MergeSpanAttributes, _error: &str) {}
}

/// Observer that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMergeObserver;

impl MergeObserver for LoggingMergeObserver {
    fn merge_started(&self, attributes: &MergeSpanAttributes) {
        tracing::debug!(
            mode = %attributes.mode,
            sources = attributes.source_count,
            fields = attributes.field_count,
            "Merge started"
        );
    }

    fn merge_committed(&self, attributes: &MergeSpanAttributes, duration_ms: f64) {
        tracing::debug!(
            mode = %attributes.mode,
            sources = attributes.source_count,
            duration_ms,
            "Merge committed"
        );
    }

    fn merge_failed(&self, attributes: &MergeSpanAttributes, error: &str) {
        tracing::warn!(
            mode = %attributes.mode,
            sources = attributes.source_count,
            failed_key = ?attributes.failed_key,
            error,
            "Merge failed"
        );
    }
}
