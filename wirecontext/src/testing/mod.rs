//! Testing utilities for code built on wirecontext.
//!
//! This module provides:
//! - Fixtures producing populated sibling contexts
//! - Assertions for field values and merge outcomes

mod assertions;
mod fixtures;

pub use assertions::{
    assert_disabled, assert_field_absent, assert_field_eq, assert_inconsistent_merge,
    assert_invalid_context,
};
pub use fixtures::{sibling_contexts, TestIdentity};
