//! # Data Model
//!
//! Core data structures for differential comparison: scalar field values,
//! dataset sides, and the record type with its derived identity signatures.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Placeholder rendered for null or absent field values.
///
/// A real string field holding this exact text is indistinguishable from an
/// absent field; callers choosing identity fields must avoid values that can
/// collide with the sentinel.
pub const NULL_SENTINEL: &str = "@NULL@";

/// Which labeled collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetSide {
    Source,
    Target,
}

impl fmt::Display for DatasetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSide::Source => write!(f, "source"),
            DatasetSide::Target => write!(f, "target"),
        }
    }
}

/// An opaque printable scalar field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Render the value as the text used in signatures and hashes.
    /// Null renders as the reserved sentinel.
    pub fn render(&self) -> String {
        match self {
            Value::Null => NULL_SENTINEL.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Insertion-ordered mapping from field name to value.
pub type Fields = IndexMap<String, Value>;

/// A single structured entity on one dataset side.
///
/// The identity-field set is fixed at construction: deduplicated, intersected
/// with the record's own field names (absent names are silently dropped), and
/// sorted, so identity values always assemble in deterministic field-name
/// order regardless of how the field map was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    side: DatasetSide,
    identity_fields: Vec<String>,
    fields: Fields,
}

impl Record {
    /// Create a record, normalizing the identity-field set.
    pub fn new(side: DatasetSide, identity_fields: &[String], fields: Fields) -> Self {
        let mut keys: Vec<String> = identity_fields
            .iter()
            .filter(|name| fields.contains_key(name.as_str()))
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        Self {
            side,
            identity_fields: keys,
            fields,
        }
    }

    pub fn side(&self) -> DatasetSide {
        self.side
    }

    pub fn identity_fields(&self) -> &[String] {
        &self.identity_fields
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Consume the record and return its field map.
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Rendered identity-field values in sorted field-name order.
    pub fn identity_values(&self) -> Vec<String> {
        self.identity_fields
            .iter()
            .map(|name| {
                self.fields
                    .get(name.as_str())
                    .map(Value::render)
                    .unwrap_or_else(|| NULL_SENTINEL.to_string())
            })
            .collect()
    }

    /// Concatenated identity values, used to resolve hash collisions.
    pub fn identity_signature(&self) -> String {
        self.identity_values().concat()
    }

    /// Order- and value-sensitive hash over the identity values.
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for value in self.identity_values() {
            value.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Concatenated non-identity, non-ignored field values in sorted
    /// field-name order. Equal signatures mean the record is unchanged.
    pub fn value_signature(&self, ignore_fields: &HashSet<String>) -> String {
        let mut names: Vec<&String> = self
            .fields
            .keys()
            .filter(|name| {
                !self.identity_fields.contains(*name) && !ignore_fields.contains(name.as_str())
            })
            .collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                self.fields
                    .get(name.as_str())
                    .map(Value::render)
                    .unwrap_or_else(|| NULL_SENTINEL.to_string())
            })
            .collect::<Vec<_>>()
            .concat()
    }
}
