//! Value types that can be stored in a field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Equality capability used by the merge reducer.
pub trait Equals {
    /// Checks whether `self` and `other` describe the same value.
    fn equals(&self, other: &Self) -> bool;
}

/// A type that can live in a namespaced field.
///
/// The `Default` value is the type's empty sentinel: writing it is a no-op,
/// and the equality reducer compares an absent field as this value.
pub trait FieldValue: Equals + Default + Clone + DeserializeOwned {
    /// Returns true for the empty sentinel.
    fn is_empty(&self) -> bool;

    /// Encodes the value for storage.
    fn to_value(&self) -> Value;

    /// Decodes a stored value, returning `None` on a shape mismatch.
    fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

impl Equals for String {
    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl FieldValue for String {
    fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Equals for Vec<String> {
    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl FieldValue for Vec<String> {
    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().cloned().map(Value::String).collect())
    }
}

/// Scope of the trial currently executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    /// The trial scope.
    pub scope: String,
}

impl Trial {
    /// Creates a trial value.
    #[must_use]
    pub fn new(scope: impl Into<String>) -> Self {
        Self { scope: scope.into() }
    }
}

impl Equals for Trial {
    fn equals(&self, other: &Self) -> bool {
        self.scope == other.scope
    }
}

impl FieldValue for Trial {
    fn is_empty(&self) -> bool {
        self.scope.is_empty()
    }

    fn to_value(&self) -> Value {
        json!({ "scope": self.scope })
    }
}

/// Input description of a behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourInput {
    /// Input types accepted by the behaviour.
    pub types: Vec<String>,
}

/// Identity of a behaviour: `{id, input: {types}, name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behaviour {
    /// Behaviour id.
    pub id: String,
    /// Behaviour input description.
    pub input: BehaviourInput,
    /// Behaviour name.
    pub name: String,
}

impl Behaviour {
    /// Creates a behaviour value without input types.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input: BehaviourInput::default(),
            name: name.into(),
        }
    }

    /// Sets the input types.
    #[must_use]
    pub fn with_input_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.types = types.into_iter().map(Into::into).collect();
        self
    }
}

impl Equals for Behaviour {
    fn equals(&self, other: &Self) -> bool {
        self.id == other.id && self.input.types == other.input.types && self.name == other.name
    }
}

impl FieldValue for Behaviour {
    fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty() && self.input.types.is_empty()
    }

    fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "input": { "types": self.input.types },
            "name": self.name,
        })
    }
}

/// An expected outcome travelling with a request.
///
/// The crate treats it as an opaque JSON object and only relies on
/// [`Equals`], which compares the objects structurally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expectation(Map<String, Value>);

impl Expectation {
    /// Creates an expectation from a JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Adds a single entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Returns the entry stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl Equals for Expectation {
    fn equals(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl FieldValue for Expectation {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinels() {
        assert!(FieldValue::is_empty(&String::new()));
        assert!(FieldValue::is_empty(&Vec::<String>::new()));
        assert!(Trial::default().is_empty());
        assert!(Behaviour::default().is_empty());
        assert!(Expectation::default().is_empty());
        assert!(!Behaviour::new("b1", "").is_empty());
    }

    #[test]
    fn test_behaviour_encoding_matches_serde() {
        let behaviour = Behaviour::new("b1", "scan").with_input_types(["string", "number"]);
        assert_eq!(behaviour.to_value(), serde_json::to_value(&behaviour).unwrap());
        assert_eq!(Behaviour::from_value(&behaviour.to_value()), Some(behaviour));
    }

    #[test]
    fn test_behaviour_equals_compares_input_types() {
        let a = Behaviour::new("b1", "scan").with_input_types(["string"]);
        let b = Behaviour::new("b1", "scan").with_input_types(["number"]);
        assert!(!a.equals(&b));
        assert!(a.equals(&a.clone()));
    }

    #[test]
    fn test_from_value_shape_mismatch() {
        assert_eq!(String::from_value(&json!(["a"])), None);
        assert_eq!(Vec::<String>::from_value(&json!("a")), None);
        assert_eq!(Trial::from_value(&json!({"id": "x"})), None);
    }

    #[test]
    fn test_expectation_structural_equality() {
        let a = Expectation::default().with_entry("output", json!(["42"]));
        let b = Expectation::default().with_entry("output", json!(["42"]));
        let c = Expectation::default().with_entry("output", json!(["43"]));

        assert!(a.equals(&b));
        assert!(!a.equals(&c));
        assert_eq!(a.get("output"), Some(&json!(["42"])));
    }
}
