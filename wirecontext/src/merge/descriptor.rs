//! Which reducer applies to which field.

use super::reducer::{ConcatenationReducer, EqualityReducer, FieldReducer, ReducerKind};
use crate::field::{Field, FieldValue};
use crate::fields;

/// Ordered list of field reducers.
///
/// Fields are reduced in insertion order, so the first failing field is
/// reproducible for a given set of sources.
#[derive(Default)]
pub struct MergeDescriptor {
    reducers: Vec<Box<dyn FieldReducer>>,
}

impl MergeDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The descriptor used for pipeline fan-in.
    ///
    /// Everything describing the unit of work must agree; source ids and
    /// names are concatenated.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .equal(fields::CLG_TREE_ID)
            .equal(fields::CURRENT_BEHAVIOUR_ID)
            .equal(fields::CURRENT_BEHAVIOUR_INPUT_TYPES)
            .equal(fields::CURRENT_BEHAVIOUR_NAME)
            .equal(fields::CURRENT_TRIAL)
            .equal(fields::DESTINATION_ID)
            .equal(fields::DESTINATION_NAME)
            .optional_equal(fields::EXPECTATION)
            .equal(fields::FIRST_BEHAVIOUR)
            .equal(fields::FIRST_INFORMATION_ID)
            .equal(fields::SESSION_ID)
            .concat(fields::SOURCE_IDS)
            .concat(fields::SOURCE_NAMES)
    }

    /// Adds an equality reducer.
    #[must_use]
    pub fn equal<T: FieldValue + 'static>(self, field: Field<T>) -> Self {
        self.with_reducer(Box::new(EqualityReducer::new(field)))
    }

    /// Adds an equality reducer for a field that may be absent everywhere.
    #[must_use]
    pub fn optional_equal<T: FieldValue + 'static>(self, field: Field<T>) -> Self {
        self.with_reducer(Box::new(EqualityReducer::optional(field)))
    }

    /// Adds a concatenation reducer.
    #[must_use]
    pub fn concat(self, field: Field<Vec<String>>) -> Self {
        self.with_reducer(Box::new(ConcatenationReducer::new(field)))
    }

    /// Adds a custom reducer. A reducer for an already present key replaces
    /// the earlier one in place.
    #[must_use]
    pub fn with_reducer(mut self, reducer: Box<dyn FieldReducer>) -> Self {
        match self.reducers.iter().position(|r| r.key() == reducer.key()) {
            Some(index) => self.reducers[index] = reducer,
            None => self.reducers.push(reducer),
        }
        self
    }

    /// Returns `(key, kind)` for every field, in reduction order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, ReducerKind)> {
        self.reducers.iter().map(|r| (r.key(), r.kind())).collect()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Returns true if no field is reduced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }

    pub(crate) fn reducers(&self) -> &[Box<dyn FieldReducer>] {
        &self.reducers
    }
}

impl std::fmt::Debug for MergeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}
