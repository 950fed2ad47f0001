//! The marshallable context container.

use super::ContextConfig;
use crate::cancellation::CancelSignal;
use crate::errors::{CancelError, ContextError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A key/value container that travels between pipeline stages.
///
/// Keys are namespaced by convention (see [`crate::fields`]). Only the
/// values are serialized; the cancellation signal is process-local and a
/// deserialized context starts with a fresh background signal.
///
/// Mutation requires `&mut self`: a context is owned by one flow at a time.
/// Use [`Context::clone_context`] to hand an independent copy to another
/// flow.
pub struct Context {
    values: HashMap<String, Value>,
    /// Signal owned by this context.
    signal: CancelSignal,
    /// Signal `signal` was derived from; clones derive from it as well.
    parent: CancelSignal,
}

impl Context {
    /// Creates a new context from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration has no parent signal.
    pub fn new(config: ContextConfig) -> Result<Self> {
        let deadline = config.effective_deadline(Utc::now());
        let parent = config
            .parent
            .ok_or_else(|| ContextError::invalid_config("parent signal must not be empty"))?;

        let signal = match deadline {
            Some(deadline) => parent.child_with_deadline(deadline),
            None => parent.child(),
        };

        Ok(Self {
            values: HashMap::new(),
            signal,
            parent,
        })
    }

    /// Creates an empty context derived from a fresh background signal.
    #[must_use]
    pub fn background() -> Self {
        Self::from_values(HashMap::new())
    }

    /// Creates a context holding `values`, derived from a fresh background
    /// signal.
    #[must_use]
    pub fn from_values(values: HashMap<String, Value>) -> Self {
        let parent = CancelSignal::background();
        Self {
            values,
            signal: parent.child(),
            parent,
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Returns the value stored under `key`, if any.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Removes `key`. Removing an absent key is a no-op.
    pub fn delete_value(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Removes `key` and returns its value.
    pub fn take_value(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Serializes `value` and stores it under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if `value` has no JSON representation.
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value);
        Ok(())
    }

    /// Decodes the value stored under `key`.
    ///
    /// Returns `None` if the key is absent or holds a value of another shape.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.value(key).and_then(|v| T::deserialize(v).ok())
    }

    /// Returns all stored values.
    #[must_use]
    pub const fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    /// Returns all keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.signal.cancel();
    }

    /// Cancels with a reason. The first reason wins.
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        self.signal.cancel_with_reason(reason);
    }

    /// Completes once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        self.signal.done().await;
    }

    /// Returns why the context was cancelled, or `None` while it is live.
    #[must_use]
    pub fn err(&self) -> Option<CancelError> {
        self.signal.err()
    }

    /// Returns `Err(Cancelled)` once the context is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` with the cancellation cause.
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(cause) => Err(cause.into()),
            None => Ok(()),
        }
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.signal.deadline()
    }

    /// Returns the signal owned by this context.
    #[must_use]
    pub const fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    /// Returns a copy with its own cancellation scope.
    ///
    /// Values are copied, not shared with the original. The copy is derived
    /// from the same parent signal and keeps the original's deadline, so
    /// cancelling the parent reaches both, while cancelling either copy
    /// leaves the other live.
    #[must_use]
    pub fn clone_context(&self) -> Self {
        let signal = match self.signal.deadline() {
            Some(deadline) => self.parent.child_with_deadline(deadline),
            None => self.parent.child(),
        };
        Self {
            values: self.values.clone(),
            signal,
            parent: self.parent.clone(),
        }
    }

    /// Derives a child context sharing these values whose signal is a child
    /// of this context's signal.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            values: self.values.clone(),
            signal: self.signal.child(),
            parent: self.signal.clone(),
        }
    }

    /// Encodes the values as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Encodes the values as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a context from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if `bytes` is not a JSON object.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Replaces this context's values with the ones decoded from `bytes`,
    /// keeping its signal.
    ///
    /// On error the values are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if `bytes` is not a JSON object.
    pub fn load_json(&mut self, bytes: &[u8]) -> Result<()> {
        let values: HashMap<String, Value> = serde_json::from_slice(bytes)?;
        debug!(keys = values.len(), "Loaded context values");
        self.values = values;
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // Sorted so equal contexts encode to equal bytes.
        let sorted: BTreeMap<&String, &Value> = self.values.iter().collect();
        sorted.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Context {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        HashMap::<String, Value>::deserialize(deserializer).map(Self::from_values)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values)
            .field("signal", &self.signal)
            .finish()
    }
}
