//! Typed accessor for one namespaced field.

use super::FieldValue;
use crate::context::Context;
use serde_json::Value;
use std::marker::PhantomData;

/// Declares a [`Field`] whose backup key is `<key>/restore`.
///
/// ```rust,ignore
/// pub const SESSION_ID: Field<String> = field!("session-id", "session id");
/// ```
#[macro_export]
macro_rules! field {
    ($key:literal, $label:literal) => {
        $crate::field::Field::new($key, concat!($key, "/restore"), $label)
    };
}

/// A typed, namespaced slot in a [`Context`].
///
/// A field is *disabled* when its primary key is absent and its backup key
/// is present. The backup holds the hidden value, or `null` if the field was
/// absent when it was disabled.
pub struct Field<T> {
    key: &'static str,
    restore_key: &'static str,
    label: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    /// Creates a field descriptor. Prefer the [`field!`](crate::field!) macro.
    #[must_use]
    pub const fn new(key: &'static str, restore_key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            restore_key,
            label,
            _marker: PhantomData,
        }
    }

    /// Returns the primary key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the backup key.
    #[must_use]
    pub const fn restore_key(&self) -> &'static str {
        self.restore_key
    }

    /// Returns the human readable name used in error messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }
}

impl<T: FieldValue> Field<T> {
    /// Returns the field value stored in `ctx`, if any.
    ///
    /// A value of the wrong shape reads as absent.
    #[must_use]
    pub fn from_context(&self, ctx: &Context) -> Option<T> {
        ctx.value(self.key).and_then(T::from_value)
    }

    /// Stores `value` in `ctx`.
    ///
    /// Writing the empty sentinel is a no-op, so an empty value and a value
    /// never written read the same.
    pub fn new_context(&self, ctx: &mut Context, value: impl Into<T>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        ctx.set_value(self.key, value.to_value());
    }

    /// Hides the field, backing up its current value.
    ///
    /// Disabling an already disabled field keeps the existing backup, so
    /// nested disable/restore pairs bring back the value hidden first.
    pub fn disable(&self, ctx: &mut Context) {
        if self.is_disabled(ctx) {
            return;
        }
        let backup = ctx.take_value(self.key).unwrap_or(Value::Null);
        ctx.set_value(self.restore_key, backup);
    }

    /// Brings back the value hidden by [`Field::disable`].
    ///
    /// Without a backup this is a no-op and the primary key is left as is.
    pub fn restore(&self, ctx: &mut Context) {
        match ctx.take_value(self.restore_key) {
            Some(Value::Null) => ctx.delete_value(self.key),
            Some(backup) => ctx.set_value(self.key, backup),
            None => {}
        }
    }

    /// Returns true if the primary key is absent and a backup is present.
    #[must_use]
    pub fn is_disabled(&self, ctx: &Context) -> bool {
        !ctx.contains_key(self.key) && ctx.contains_key(self.restore_key)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("restore_key", &self.restore_key)
            .finish()
    }
}
