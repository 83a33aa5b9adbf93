//! # Partial Updates
//!
//! Builds `UPDATE ... SET <only the supplied fields>` statements for any
//! table, and validates caller-supplied field sets against an allow-list.
//!
//! ## Statement Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  build_patch("users", "id", "42", { phone: "555", name: "Ann" })        │
//! │       │                                                                 │
//! │       ▼  fields sorted by name, timestamp touch appended                │
//! │                                                                         │
//! │  UPDATE users SET name = :name, phone = :phone,                         │
//! │         updated_at = <now> WHERE id = :id                               │
//! │       │                                                                 │
//! │       ▼  key merged under :id, handed to the Binder                     │
//! │                                                                         │
//! │  UPDATE users SET name = ?1, phone = ?2,                                │
//! │         updated_at = strftime(...) WHERE id = ?3                        │
//! │  args = ["Ann", "555", "42"]                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The touched columns are exactly the supplied fields plus `updated_at`.

use crate::binder::{is_ident_continue, is_ident_start, Binder, BoundQuery, Dialect};
use crate::error::{QueryError, QueryResult};
use crate::value::{FieldMap, Value};
use crate::{KEY_PARAM, UPDATED_AT_COLUMN};

// =============================================================================
// Patch Request
// =============================================================================

/// A primary key plus the fields to change. Request-scoped, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchRequest {
    pub id: String,
    pub fields: FieldMap,
}

impl PatchRequest {
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        PatchRequest {
            id: id.into(),
            fields,
        }
    }
}

// =============================================================================
// Patch Set
// =============================================================================

/// A field map whose keys have been checked against an entity's allow-list.
///
/// This is the boundary between untrusted request bodies and the patch
/// builder: column names that reach `build_patch` come from here, never
/// straight from a JSON object.
/// The only constructors take the allow-list, so every `PatchSet` in
/// existence has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchSet(FieldMap);

impl PatchSet {
    /// Converts a JSON object into a patch set.
    ///
    /// ## Mapping
    /// ```text
    /// "Ann"   → Value::Text
    /// 3       → Value::Int
    /// 9.99    → Value::Float
    /// null    → Value::Null
    /// true / [..] / {..} → UnsupportedValue
    /// ```
    ///
    /// ## Errors
    /// * `UnknownField` - key not in `allowed`
    /// * `UnsupportedValue` - value kind has no column representation
    pub fn from_json(
        allowed: &[&str],
        body: &serde_json::Map<String, serde_json::Value>,
    ) -> QueryResult<Self> {
        let mut fields = FieldMap::new();

        for (field, value) in body {
            ensure_allowed(allowed, field)?;
            fields.insert(field.as_str(), json_to_value(field, value)?);
        }

        Ok(PatchSet(fields))
    }

    /// Checks an already-typed field map against `allowed`.
    pub fn from_fields(allowed: &[&str], fields: FieldMap) -> QueryResult<Self> {
        for field in fields.keys() {
            ensure_allowed(allowed, field)?;
        }
        Ok(PatchSet(fields))
    }

    pub fn fields(&self) -> &FieldMap {
        &self.0
    }

    pub fn into_fields(self) -> FieldMap {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn ensure_allowed(allowed: &[&str], field: &str) -> QueryResult<()> {
    if allowed.contains(&field) {
        Ok(())
    } else {
        Err(QueryError::UnknownField {
            field: field.to_string(),
        })
    }
}

fn json_to_value(field: &str, value: &serde_json::Value) -> QueryResult<Value> {
    use serde_json::Value as Json;

    let unsupported = |kind: &str| QueryError::UnsupportedValue {
        field: field.to_string(),
        kind: kind.to_string(),
    };

    match value {
        Json::Null => Ok(Value::Null),
        Json::String(text) => Ok(Value::Text(text.clone())),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .ok_or_else(|| unsupported("number")),
        Json::Bool(_) => Err(unsupported("boolean")),
        Json::Array(_) => Err(unsupported("array")),
        Json::Object(_) => Err(unsupported("object")),
    }
}

// =============================================================================
// Patch Builder
// =============================================================================

/// Builds partial-update statements for a dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchBuilder {
    binder: Binder,
}

impl PatchBuilder {
    pub fn new(dialect: Dialect) -> Self {
        PatchBuilder {
            binder: Binder::new(dialect),
        }
    }

    /// Builds `UPDATE table SET <fields>, updated_at = <now> WHERE key_column = :id`.
    ///
    /// ## Errors
    /// * `EmptyPatch` - `fields` is empty (checked first)
    /// * `InvalidIdentifier` - table, key column or a field is not an identifier
    /// * `ReservedField` - `fields` contains `id` or `updated_at`
    pub fn build(
        &self,
        table: &str,
        key_column: &str,
        key_value: impl Into<Value>,
        fields: &FieldMap,
    ) -> QueryResult<BoundQuery> {
        if fields.is_empty() {
            return Err(QueryError::EmptyPatch);
        }

        ensure_identifier(table)?;
        ensure_identifier(key_column)?;

        let mut assignments = Vec::with_capacity(fields.len() + 1);
        for column in fields.keys() {
            ensure_identifier(column)?;
            if column == KEY_PARAM || column == UPDATED_AT_COLUMN || column == key_column {
                return Err(QueryError::ReservedField {
                    name: column.to_string(),
                });
            }
            assignments.push(format!("{column} = :{column}"));
        }
        assignments.push(format!(
            "{UPDATED_AT_COLUMN} = {}",
            self.binder.dialect().now_expr()
        ));

        let template = format!(
            "UPDATE {table} SET {} WHERE {key_column} = :{KEY_PARAM}",
            assignments.join(", ")
        );

        let mut params = fields.clone();
        params.insert(KEY_PARAM, key_value);

        self.binder.bind(&template, &params)
    }
}

/// Builds a patch statement with the default (SQLite) dialect.
///
/// ## Example
/// ```rust
/// use dispatch_core::{build_patch, FieldMap, Value};
///
/// let fields = FieldMap::new().with("name", "Ann");
/// let bound = build_patch("t", "id", "42", &fields).unwrap();
///
/// assert!(bound.sql().starts_with("UPDATE t SET name = ?1, updated_at = "));
/// assert!(bound.sql().ends_with("WHERE id = ?2"));
/// assert_eq!(bound.args()[1], Value::Text("42".to_string()));
/// ```
pub fn build_patch(
    table: &str,
    key_column: &str,
    key_value: impl Into<Value>,
    fields: &FieldMap,
) -> QueryResult<BoundQuery> {
    PatchBuilder::default().build(table, key_column, key_value, fields)
}

/// Returns true if `name` is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => is_ident_start(*first) && rest.iter().all(|b| is_ident_continue(*b)),
        None => false,
    }
}

pub(crate) fn ensure_identifier(name: &str) -> QueryResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_single_field_patch() {
        let fields = FieldMap::new().with("name", "Ann");

        let bound = PatchBuilder::new(Dialect::Postgres)
            .build("t", "id", "42", &fields)
            .unwrap();

        assert_eq!(
            bound.sql(),
            "UPDATE t SET name = $1, updated_at = now() WHERE id = $2"
        );
        assert_eq!(bound.args(), &[text("Ann"), text("42")]);
    }

    #[test]
    fn test_fields_are_ordered_lexicographically() {
        let fields = FieldMap::new()
            .with("quantity", 2)
            .with("courier_id", Value::nullable_text(""))
            .with("name", "Lunch");

        let bound = PatchBuilder::new(Dialect::Postgres)
            .build("orders", "id", "o-1", &fields)
            .unwrap();

        assert_eq!(
            bound.sql(),
            "UPDATE orders SET courier_id = $1, name = $2, quantity = $3, updated_at = now() WHERE id = $4"
        );
        assert_eq!(
            bound.args(),
            &[Value::OptText(None), text("Lunch"), Value::Int(2), text("o-1")]
        );
    }

    #[test]
    fn test_same_input_same_statement() {
        let a = FieldMap::new().with("phone", "1").with("name", "x");
        let b = FieldMap::new().with("name", "x").with("phone", "1");

        assert_eq!(
            build_patch("users", "id", "k", &a).unwrap(),
            build_patch("users", "id", "k", &b).unwrap()
        );
    }

    #[test]
    fn test_empty_patch_fails() {
        let err = build_patch("t", "id", "42", &FieldMap::new()).unwrap_err();
        assert_eq!(err, QueryError::EmptyPatch);
    }

    #[test]
    fn test_empty_patch_checked_before_identifiers() {
        let err = build_patch("bad table", "id", "42", &FieldMap::new()).unwrap_err();
        assert_eq!(err, QueryError::EmptyPatch);
    }

    #[test]
    fn test_reserved_fields_rejected() {
        for reserved in ["id", "updated_at"] {
            let fields = FieldMap::new().with(reserved, "x");
            let err = build_patch("t", "id", "42", &fields).unwrap_err();
            assert_eq!(
                err,
                QueryError::ReservedField {
                    name: reserved.to_string()
                }
            );
        }
    }

    #[test]
    fn test_injected_column_name_rejected() {
        let fields = FieldMap::new().with("name = 'x', phone", "y");

        let err = build_patch("users", "id", "42", &fields).unwrap_err();

        assert!(matches!(err, QueryError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("name"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("courier_id2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2name"));
        assert!(!is_identifier("o.name"));
        assert!(!is_identifier("name;--"));
    }

    #[test]
    fn test_patch_set_from_json() {
        let body = object(json!({
            "name": "Ann",
            "quantity": 3,
            "price": 9.5,
            "courier_id": null
        }));

        let patch =
            PatchSet::from_json(&["name", "quantity", "price", "courier_id"], &body).unwrap();

        assert_eq!(patch.fields().get("name"), Some(&text("Ann")));
        assert_eq!(patch.fields().get("quantity"), Some(&Value::Int(3)));
        assert_eq!(patch.fields().get("price"), Some(&Value::Float(9.5)));
        assert_eq!(patch.fields().get("courier_id"), Some(&Value::Null));
    }

    #[test]
    fn test_patch_set_rejects_unknown_field() {
        let body = object(json!({ "name": "Ann", "is_admin": 1 }));

        let err = PatchSet::from_json(&["name", "phone"], &body).unwrap_err();

        assert_eq!(
            err,
            QueryError::UnknownField {
                field: "is_admin".to_string()
            }
        );
    }

    #[test]
    fn test_patch_set_rejects_unsupported_values() {
        let body = object(json!({ "name": ["a", "b"] }));

        let err = PatchSet::from_json(&["name"], &body).unwrap_err();

        assert!(matches!(err, QueryError::UnsupportedValue { ref kind, .. } if kind == "array"));
    }

    #[test]
    fn test_patch_set_from_fields_checks_every_key() {
        let fields = FieldMap::new().with("phone", "555").with("is_admin", "1");

        let err = PatchSet::from_fields(&["name", "phone"], fields).unwrap_err();

        assert!(matches!(err, QueryError::UnknownField { ref field } if field == "is_admin"));
    }
}
