//! Per-field merge reducers.

use crate::context::Context;
use crate::errors::{ContextError, InconsistentMergeError, Result};
use crate::field::{Equals, Field, FieldValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// How a field is combined across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducerKind {
    /// All sources must agree.
    Equality,
    /// List values are appended in source order.
    Concatenation,
}

/// How absent fields are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Absent fields read as their empty value.
    #[default]
    Lenient,
    /// Every non-optional field must be present in every source.
    Strict,
}

impl MergeMode {
    /// Returns the mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

/// Reduces one field of many sources into one staged value.
///
/// `Ok(None)` means the field must be absent from the merged context.
pub trait FieldReducer: Send + Sync {
    /// The field's primary key.
    fn key(&self) -> &'static str;

    /// The reducer kind.
    fn kind(&self) -> ReducerKind;

    /// Reduces the field across `sources`.
    fn reduce(&self, sources: &[Context], mode: MergeMode) -> Result<Option<Value>>;
}

fn missing(label: &str) -> ContextError {
    ContextError::invalid_context(format!("{label} must not be empty"))
}

/// Requires all sources to hold the same value.
pub struct EqualityReducer<T> {
    field: Field<T>,
    /// Absence is a value of its own instead of reading as empty.
    optional: bool,
}

impl<T: FieldValue> EqualityReducer<T> {
    /// Reducer for a field whose absence reads as its empty value.
    #[must_use]
    pub const fn new(field: Field<T>) -> Self {
        Self {
            field,
            optional: false,
        }
    }

    /// Reducer for a field that may legitimately be absent everywhere.
    ///
    /// A source without the field disagrees with a source that has it.
    #[must_use]
    pub const fn optional(field: Field<T>) -> Self {
        Self {
            field,
            optional: true,
        }
    }

    fn read(&self, source: &Context, mode: MergeMode) -> Result<Option<T>> {
        let value = self.field.from_context(source);
        if self.optional {
            return Ok(value);
        }
        match (value, mode) {
            (Some(value), _) => Ok(Some(value)),
            (None, MergeMode::Strict) => Err(missing(self.field.label())),
            (None, MergeMode::Lenient) => Ok(Some(T::default())),
        }
    }
}

fn same<T: Equals>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.equals(b),
        (None, None) => true,
        _ => false,
    }
}

impl<T: FieldValue> FieldReducer for EqualityReducer<T> {
    fn key(&self) -> &'static str {
        self.field.key()
    }

    fn kind(&self) -> ReducerKind {
        ReducerKind::Equality
    }

    fn reduce(&self, sources: &[Context], mode: MergeMode) -> Result<Option<Value>> {
        let values = sources
            .iter()
            .map(|source| self.read(source, mode))
            .collect::<Result<Vec<_>>>()?;

        let Some((reference, rest)) = values.split_first() else {
            return Ok(None);
        };

        for (offset, value) in rest.iter().enumerate() {
            if !same(reference.as_ref(), value.as_ref()) {
                let source_index = offset + 1;
                warn!(key = self.field.key(), source_index, "Merge sources disagree");
                return Err(InconsistentMergeError::new(self.field.key(), source_index).into());
            }
        }

        Ok(reference
            .as_ref()
            .filter(|value| !value.is_empty())
            .map(FieldValue::to_value))
    }
}

/// Appends list values of all sources in source order.
pub struct ConcatenationReducer {
    field: Field<Vec<String>>,
}

impl ConcatenationReducer {
    /// Creates a concatenation reducer.
    #[must_use]
    pub const fn new(field: Field<Vec<String>>) -> Self {
        Self { field }
    }
}

impl FieldReducer for ConcatenationReducer {
    fn key(&self) -> &'static str {
        self.field.key()
    }

    fn kind(&self) -> ReducerKind {
        ReducerKind::Concatenation
    }

    fn reduce(&self, sources: &[Context], mode: MergeMode) -> Result<Option<Value>> {
        let mut combined = Vec::new();
        for source in sources {
            match self.field.from_context(source) {
                Some(values) => combined.extend(values),
                None if mode == MergeMode::Strict => return Err(missing(self.field.label())),
                None => {}
            }
        }

        // Written even when empty.
        Ok(Some(combined.to_value()))
    }
}
