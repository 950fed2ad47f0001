//! # Wirecontext
//!
//! A marshallable, mergeable request context for pipelines whose units of
//! work cross process boundaries.
//!
//! Wirecontext provides:
//!
//! - **Context container**: a string-keyed map of JSON values plus a cancellation signal
//! - **Typed fields**: namespaced accessors with disable/restore semantics
//! - **Wire format**: deterministic JSON marshalling of the values
//! - **Fan-in merge**: combine sibling contexts with equality and concatenation reducers
//!
//! ## Quick Start
//!
//! ```rust
//! use wirecontext::prelude::*;
//!
//! let mut left = Context::background();
//! let mut right = Context::background();
//! fields::CURRENT_BEHAVIOUR_NAME.new_context(&mut left, "scan");
//! fields::CURRENT_BEHAVIOUR_NAME.new_context(&mut right, "scan");
//! fields::SOURCE_IDS.new_context(&mut left, vec!["s1".to_string()]);
//! fields::SOURCE_IDS.new_context(&mut right, vec!["s2".to_string()]);
//!
//! let mut merged = Context::background();
//! merge(&mut merged, &[left, right])?;
//!
//! assert_eq!(
//!     fields::SOURCE_IDS.from_context(&merged),
//!     Some(vec!["s1".to_string(), "s2".to_string()])
//! );
//! # Ok::<(), wirecontext::errors::ContextError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod context;
pub mod errors;
pub mod field;
pub mod fields;
pub mod merge;
pub mod observability;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancelSignal;
    pub use crate::context::{Context, ContextConfig};
    pub use crate::errors::{CancelError, ContextError, InconsistentMergeError, Result};
    pub use crate::field::{Behaviour, Expectation, Field, FieldValue, Trial};
    pub use crate::fields;
    pub use crate::merge::{merge, new_from_contexts, MergeDescriptor, MergeMode, Merger};
    pub use crate::observability::{LoggingMergeObserver, MergeObserver, NoOpMergeObserver};
}
