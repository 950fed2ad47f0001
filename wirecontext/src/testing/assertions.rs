//! Test assertions for contexts and merges.

use crate::context::Context;
use crate::errors::{ContextError, Result};
use crate::field::{Field, FieldValue};
use std::fmt::Debug;

/// Asserts that `field` reads back as `expected`.
pub fn assert_field_eq<T>(ctx: &Context, field: Field<T>, expected: impl Into<T>)
where
    T: FieldValue + Debug + PartialEq,
{
    let expected = expected.into();
    let actual = field.from_context(ctx);
    assert_eq!(
        actual.as_ref(),
        Some(&expected),
        "Expected '{}' to be {:?}, got {:?}",
        field.key(),
        expected,
        actual
    );
}

/// Asserts that `field` is absent.
pub fn assert_field_absent<T: FieldValue + Debug>(ctx: &Context, field: Field<T>) {
    let actual = field.from_context(ctx);
    assert!(
        actual.is_none(),
        "Expected '{}' to be absent, got {:?}",
        field.key(),
        actual
    );
}

/// Asserts that `field` is disabled.
pub fn assert_disabled<T: FieldValue>(ctx: &Context, field: Field<T>) {
    assert!(
        field.is_disabled(ctx),
        "Expected '{}' to be disabled. Keys: {:?}",
        field.key(),
        ctx.keys()
    );
}

/// Asserts that a merge failed because `key` diverged.
pub fn assert_inconsistent_merge<T: Debug>(result: &Result<T>, key: &str) {
    match result {
        Err(ContextError::InconsistentMerge(err)) => assert_eq!(
            err.key, key,
            "Expected '{}' to diverge, but '{}' did",
            key, err.key
        ),
        other => panic!("Expected inconsistent merge on '{key}', got {other:?}"),
    }
}

/// Asserts that an operation failed because a required field was missing.
pub fn assert_invalid_context<T: Debug>(result: &Result<T>) {
    assert!(
        matches!(result, Err(ContextError::InvalidContext(_))),
        "Expected invalid context, got {result:?}"
    );
}
