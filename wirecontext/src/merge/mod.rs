//! N-way merge of contexts at pipeline fan-in points.
//!
//! This module provides:
//! - Equality and concatenation reducers
//! - MergeDescriptor, the ordered field-to-reducer mapping
//! - Merger, which stages all reductions before committing them

mod descriptor;
#[cfg(test)]
mod merge_tests;
mod merger;
mod reducer;

pub use descriptor::MergeDescriptor;
pub use merger::{merge, new_from_contexts, Merger};
pub use reducer::{
    ConcatenationReducer, EqualityReducer, FieldReducer, MergeMode, ReducerKind,
};
