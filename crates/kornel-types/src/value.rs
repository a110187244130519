//! Value types stored in variable slots and passed as tool arguments.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A shell value.
///
/// Scalars cover the usual primitives. Indexed and associative arrays are
/// first-class so that `NAME=(a b c)` can back an enum declaration and
/// `TYPE -a`/`TYPE -A` variables can hold one ordinal per element.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Indexed array, `NAME=(a b c)`.
    Array(Vec<Value>),
    /// Associative array, `NAME=([k]=v ...)`.
    Assoc(BTreeMap<String, Value>),
}

impl Value {
    /// True for `Value::Null`, the "unset" slot.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for indexed or associative arrays.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Assoc(_))
    }

    /// Number of elements: arrays report their length, scalars 1, null 0.
    pub fn len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Array(items) => items.len(),
            Value::Assoc(map) => map.len(),
            _ => 1,
        }
    }

    /// True when `len()` is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Delegate to value_to_json for a single JSON representation.
        crate::result::value_to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(crate::result::json_to_value(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_of_scalars_and_arrays() {
        assert_eq!(Value::Null.len(), 0);
        assert_eq!(Value::Int(3).len(), 1);
        assert_eq!(Value::Array(vec!["a".into(), "b".into()]).len(), 2);
        assert!(Value::Assoc(BTreeMap::new()).is_empty());
    }

    #[test]
    fn serde_roundtrip_through_json() {
        let value = Value::Array(vec![Value::from("red"), Value::Int(2), Value::Null]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"["red",2,null]"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
