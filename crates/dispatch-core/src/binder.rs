//! # Parameter Binder
//!
//! Rewrites a query template with named placeholders into a positional
//! query plus an ordered argument list.
//!
//! ## How Binding Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Template:                                                              │
//! │    UPDATE users SET name = :name WHERE id = :id OR parent = :id         │
//! │                                                                         │
//! │  Field map: { id: "42", name: "Ann" }                                   │
//! │       │                                                                 │
//! │       ▼  single left-to-right scan                                      │
//! │                                                                         │
//! │    :name  first seen → index 1, args = ["Ann"]                          │
//! │    :id    first seen → index 2, args = ["Ann", "42"]                    │
//! │    :id    seen again → reuse index 2                                    │
//! │                                                                         │
//! │  Output (SQLite):                                                       │
//! │    UPDATE users SET name = ?1 WHERE id = ?2 OR parent = ?2              │
//! │    args = ["Ann", "42"]                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Rules
//! - A token is `:` followed by `[A-Za-z_][A-Za-z0-9_]*`, read greedily, so
//!   `:name` never matches inside `:name_full`.
//! - `::` is a cast operator, not a token.
//! - Nothing inside `'single quoted'` literals, `"quoted identifiers"` or
//!   `-- line comments` is a token (`'HH24:MI:SS'` stays intact).
//!
//! Values are never written into the query text.

use std::collections::HashMap;

use crate::error::{QueryError, QueryResult};
use crate::value::{FieldMap, Value};

// =============================================================================
// Dialect
// =============================================================================

/// Positional placeholder syntax and timestamp expression of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `?1`, `?2`, ... (numbered, reusable)
    #[default]
    Sqlite,
    /// `$1`, `$2`, ...
    Postgres,
}

impl Dialect {
    /// Renders the positional placeholder for a 1-based index.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{index}"),
            Dialect::Postgres => format!("${index}"),
        }
    }

    /// SQL expression for "current timestamp" used by `updated_at` touches.
    ///
    /// SQLite stores timestamps as ISO-8601 text with millisecond precision so
    /// they decode straight into `DateTime<Utc>`.
    pub fn now_expr(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            Dialect::Postgres => "now()",
        }
    }
}

// =============================================================================
// Bound Query
// =============================================================================

/// A ready-to-execute statement: positional SQL plus its arguments.
///
/// `args()[i]` is the value for placeholder `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    sql: String,
    args: Vec<Value>,
}

impl BoundQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

// =============================================================================
// Binder
// =============================================================================

/// Named → positional placeholder translator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binder {
    dialect: Dialect,
}

impl Binder {
    pub fn new(dialect: Dialect) -> Self {
        Binder { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Binds `fields` into `template`.
    ///
    /// ## Errors
    /// * `UnboundParameter` - a token has no entry in `fields`
    /// * `UnusedParameter` - `fields` has an entry no token references
    ///
    /// On error no partially rewritten query is returned.
    ///
    /// ## Example
    /// ```rust
    /// use dispatch_core::{Binder, Dialect, FieldMap, Value};
    ///
    /// let fields = FieldMap::new().with("id", "42");
    /// let bound = Binder::new(Dialect::Postgres)
    ///     .bind("DELETE FROM users WHERE id = :id", &fields)
    ///     .unwrap();
    ///
    /// assert_eq!(bound.sql(), "DELETE FROM users WHERE id = $1");
    /// assert_eq!(bound.args(), &[Value::Text("42".to_string())]);
    /// ```
    pub fn bind(&self, template: &str, fields: &FieldMap) -> QueryResult<BoundQuery> {
        let bytes = template.as_bytes();
        let mut sql = String::with_capacity(template.len());
        let mut args: Vec<Value> = Vec::with_capacity(fields.len());
        let mut assigned: HashMap<&str, usize> = HashMap::with_capacity(fields.len());

        // Start of the text not yet copied into `sql`.
        let mut copied = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                quote @ (b'\'' | b'"') => i = skip_quoted(bytes, i, quote),
                b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line(bytes, i),
                b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
                b':' if bytes.get(i + 1).is_some_and(|b| is_ident_start(*b)) => {
                    let start = i + 1;
                    let end = start
                        + bytes[start..]
                            .iter()
                            .take_while(|b| is_ident_continue(**b))
                            .count();
                    let name = &template[start..end];

                    let index = match assigned.get(name) {
                        Some(index) => *index,
                        None => {
                            let value = fields.get(name).ok_or_else(|| {
                                QueryError::UnboundParameter {
                                    name: name.to_string(),
                                }
                            })?;
                            args.push(value.clone());
                            assigned.insert(name, args.len());
                            args.len()
                        }
                    };

                    sql.push_str(&template[copied..i]);
                    sql.push_str(&self.dialect.placeholder(index));
                    copied = end;
                    i = end;
                }
                _ => i += 1,
            }
        }
        sql.push_str(&template[copied..]);

        if let Some(name) = fields.keys().find(|name| !assigned.contains_key(name)) {
            return Err(QueryError::UnusedParameter {
                name: name.to_string(),
            });
        }

        Ok(BoundQuery { sql, args })
    }
}

/// Binds with the default (SQLite) dialect.
pub fn bind(template: &str, fields: &FieldMap) -> QueryResult<BoundQuery> {
    Binder::default().bind(template, fields)
}

/// Returns true for characters allowed to start a placeholder name.
pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

pub(crate) fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns the index just past the closing quote. A doubled quote is an
/// escaped quote. An unterminated literal runs to the end of the template.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut j = open + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    bytes.len()
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |offset| start + offset + 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
