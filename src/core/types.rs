//! Core identifier and value types shared across the engine.
//!
//! The rule-argument type system uses an enum-based approach:
//! - Closed set of types: rule declarations carry a finite set of data shapes
//! - Zero-cost pattern matching when a host interprets arguments
//! - Serialization: serde handles enums natively

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Name of a validation profile.
///
/// Behaves like an interned symbol: compared and hashed by content, cheap to
/// clone, displayed without decoration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileName(String);

impl ProfileName {
    /// Create a profile name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProfileName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ProfileName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<&str> for ProfileName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Unique identifier for a record instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Create a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a record ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Multiplicity of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// One related record or none.
    Singular,
    /// An ordered collection of related records.
    Plural,
}

/// Data values carried by rule arguments.
///
/// The engine never interprets these beyond moving them around; hosts match
/// on them when translating an attached rule into a concrete check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Symbolic name, typically a field or relation name
    Symbol(String),
    /// Boolean value
    Boolean(bool),
    /// Homogeneous list of values
    List(Vec<Value>),
    /// Key-value map
    Map(HashMap<String, Value>),
    /// Represents absence of value
    None,
}

impl Value {
    /// Shorthand for a `Symbol` value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Shorthand for a `String` value.
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    /// Get the symbolic name, accepting both `Symbol` and `String`.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) | Value::String(name) => Some(name),
            _ => None,
        }
    }

    /// Get the contained integer, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the contained float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Get the contained boolean, if any.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value represents "nothing": `None` or a blank string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::None => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        let id = RecordId::new();
        let display = format!("{}", id);
        assert_eq!(display.len(), 8);
    }

    #[test]
    fn test_profile_name_equality() {
        let name = ProfileName::from("soft");
        assert_eq!(name, "soft");
        assert_eq!(name, ProfileName::new("soft"));
        assert!(!name.is_blank());
        assert!(ProfileName::new("  ").is_blank());
    }

    #[test]
    fn test_value_as_name() {
        assert_eq!(Value::symbol("name").as_name(), Some("name"));
        assert_eq!(Value::string("name").as_name(), Some("name"));
        assert_eq!(Value::Integer(1).as_name(), None);
    }

    #[test]
    fn test_value_blankness() {
        assert!(Value::None.is_blank());
        assert!(Value::string("  ").is_blank());
        assert!(!Value::string("x").is_blank());
        assert!(!Value::Integer(0).is_blank());
    }
}
