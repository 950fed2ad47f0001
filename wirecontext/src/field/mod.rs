//! Namespaced field accessors.
//!
//! A [`Field`] pairs a reserved key with typed read, write, disable and
//! restore operations. The fields used across the pipeline are declared in
//! [`crate::fields`].

mod accessor;
mod value;

pub use accessor::Field;
pub use value::{Behaviour, BehaviourInput, Equals, Expectation, FieldValue, Trial};
