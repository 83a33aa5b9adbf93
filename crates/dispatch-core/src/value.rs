//! # Values and Field Maps
//!
//! The parameter values a query can carry, and the column → value map that
//! repositories hand to the binder.
//!
//! ## Value Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Value::Text("Ann")        → bound as TEXT                              │
//! │  Value::Int(3)             → bound as INTEGER                           │
//! │  Value::Float(9.99)        → bound as REAL                              │
//! │  Value::Null               → bound as SQL NULL (never the text "null")  │
//! │  Value::OptText(None)      → bound as SQL NULL                          │
//! │  Value::OptText(Some(id))  → bound as TEXT                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;

// =============================================================================
// Value
// =============================================================================

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    /// Explicit SQL NULL.
    Null,
    /// Nullable text column (foreign keys, optional strings).
    OptText(Option<String>),
}

impl Value {
    /// Builds a nullable text value where an empty string means NULL.
    ///
    /// Reference columns arrive as plain strings from request bodies; an
    /// empty id means "no reference" and must bind as NULL so the foreign
    /// key constraint is not checked against `''`.
    pub fn nullable_text(text: &str) -> Self {
        if text.is_empty() {
            Value::OptText(None)
        } else {
            Value::OptText(Some(text.to_string()))
        }
    }

    /// Returns true if this value binds as SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::OptText(None))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&String> for Value {
    fn from(text: &String) -> Self {
        Value::Text(text.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        Value::OptText(text)
    }
}

impl From<Option<&str>> for Value {
    fn from(text: Option<&str>) -> Self {
        Value::OptText(text.map(str::to_string))
    }
}

// =============================================================================
// Field Map
// =============================================================================

/// Mapping from column (or placeholder) name to value.
///
/// Backed by a `BTreeMap`, so iteration is lexicographic by name. The binder
/// does not depend on that order, but the patch builder uses it to emit a
/// reproducible `SET` clause.
///
/// ## Example
/// ```rust
/// use dispatch_core::{FieldMap, Value};
///
/// let fields = FieldMap::new().with("name", "Ann").with("quantity", 3);
/// assert_eq!(fields.get("quantity"), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(BTreeMap<String, Value>);

impl FieldMap {
    pub fn new() -> Self {
        FieldMap(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FieldMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_text() {
        assert_eq!(Value::nullable_text(""), Value::OptText(None));
        assert_eq!(
            Value::nullable_text("abc"),
            Value::OptText(Some("abc".to_string()))
        );
        assert!(Value::nullable_text("").is_null());
        assert!(Value::Null.is_null());
        assert!(!Value::from("null").is_null());
    }

    #[test]
    fn test_field_map_keys_are_sorted() {
        let fields = FieldMap::new()
            .with("phone", "555")
            .with("name", "Ann")
            .with("courier_id", None::<String>);

        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, vec!["courier_id", "name", "phone"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut fields = FieldMap::new().with("name", "Ann");
        let previous = fields.insert("name", "Bob");

        assert_eq!(previous, Some(Value::Text("Ann".to_string())));
        assert_eq!(fields.len(), 1);
    }
}
