//! Fan-in of sibling contexts.

use super::{MergeDescriptor, MergeMode};
use crate::context::Context;
use crate::errors::Result;
use crate::fields;
use crate::observability::{LoggingMergeObserver, MergeObserver, MergeSpanAttributes, SpanTimer};
use serde_json::Value;
use std::sync::Arc;

/// Merges contexts produced by parallel branches.
///
/// A merge is all-or-nothing: every field is reduced into a scratch list
/// first, and the target is only written once all reducers succeeded.
pub struct Merger {
    descriptor: MergeDescriptor,
    mode: MergeMode,
    observer: Arc<dyn MergeObserver>,
}

impl Default for Merger {
    fn default() -> Self {
        Self::new(MergeDescriptor::standard())
    }
}

impl Merger {
    /// Creates a lenient merger for `descriptor`.
    #[must_use]
    pub fn new(descriptor: MergeDescriptor) -> Self {
        Self {
            descriptor,
            mode: MergeMode::Lenient,
            observer: Arc::new(LoggingMergeObserver),
        }
    }

    /// Sets the merge mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn MergeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &MergeDescriptor {
        &self.descriptor
    }

    /// Returns the merge mode.
    #[must_use]
    pub const fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Reduces `sources` into `target`.
    ///
    /// Fields outside the descriptor are left untouched in `target`. A field
    /// that reduces to nothing is removed from `target`.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentMerge` when an equality field disagrees, or
    /// `InvalidContext` when a required field is missing in strict mode. On
    /// error `target` is unchanged.
    pub fn merge(&self, target: &mut Context, sources: &[Context]) -> Result<()> {
        let timer = SpanTimer::start();
        let mut attributes =
            MergeSpanAttributes::new(self.mode.as_str(), sources.len(), self.descriptor.len());
        if let Some(session_id) = sources.first().and_then(|s| fields::SESSION_ID.from_context(s)) {
            attributes = attributes.with_session_id(session_id);
        }
        self.observer.merge_started(&attributes);

        let mut staged: Vec<(&'static str, Option<Value>)> = Vec::with_capacity(self.descriptor.len());
        for reducer in self.descriptor.reducers() {
            match reducer.reduce(sources, self.mode) {
                Ok(value) => staged.push((reducer.key(), value)),
                Err(err) => {
                    let attributes = attributes.clone().with_failed_key(reducer.key());
                    self.observer.merge_failed(&attributes, &err.to_string());
                    return Err(err);
                }
            }
        }

        for (key, value) in staged {
            match value {
                Some(value) => target.set_value(key, value),
                None => target.delete_value(key),
            }
        }

        self.observer.merge_committed(&attributes, timer.elapsed_ms());
        Ok(())
    }

    /// Reduces `sources` into a fresh background context.
    ///
    /// # Errors
    ///
    /// See [`Merger::merge`].
    pub fn merge_into_new(&self, sources: &[Context]) -> Result<Context> {
        let mut target = Context::background();
        self.merge(&mut target, sources)?;
        Ok(target)
    }
}

impl std::fmt::Debug for Merger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merger")
            .field("descriptor", &self.descriptor)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Merges `sources` into `target` with the standard descriptor.
///
/// # Errors
///
/// Returns `InconsistentMerge` when an equality field disagrees.
pub fn merge(target: &mut Context, sources: &[Context]) -> Result<()> {
    Merger::default().merge(target, sources)
}

/// Builds a new context from `sources`, requiring every standard field to be
/// present in every source. The expectation stays optional.
///
/// # Errors
///
/// Returns `InvalidContext` for a missing field and `InconsistentMerge` for
/// diverging ones.
pub fn new_from_contexts(sources: &[Context]) -> Result<Context> {
    Merger::default()
        .with_mode(MergeMode::Strict)
        .merge_into_new(sources)
}
