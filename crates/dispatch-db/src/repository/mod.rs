//! # Repository Module
//!
//! Database repository implementations for Dispatch.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Repository, Six Entities                         │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  db.couriers().patch(&request)                                  │
//! │       ▼                                                                 │
//! │  Repository<Courier>                                                   │
//! │  ├── create / get_by_id / get_list                                     │
//! │  ├── update / patch / delete                                           │
//! │  └── count                                                             │
//! │       │                                                                 │
//! │       │  Entity trait: table, columns, projection, row decoder         │
//! │       │  Binder / PatchBuilder: named template → ?N + args             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every statement reaches SQLite with its values as bound parameters.   │
//! │  Table and column names come from `Entity` constants, never from input.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository)
//! - [`CustomerRepository`](customer::CustomerRepository)
//! - [`CourierRepository`](courier::CourierRepository)
//! - [`CategoryRepository`](category::CategoryRepository)
//! - [`ProductRepository`](product::ProductRepository)
//! - [`OrderRepository`](order::OrderRepository)

pub mod category;
pub mod courier;
pub mod customer;
pub mod order;
pub mod product;
pub mod user;

use std::fmt;
use std::marker::PhantomData;

use dispatch_core::validation::{validate_fields, validate_search_query};
use dispatch_core::{
    Binder, BoundQuery, Dialect, FieldMap, ListRequest, ListResponse, PatchBuilder, PatchRequest,
    PatchSet, Validate, Value, KEY_PARAM,
};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Primary key column of every table.
const KEY_COLUMN: &str = "id";

/// Text columns stored without surrounding whitespace.
const TRIMMED_COLUMNS: &[&str] = &["name", "phone"];

// =============================================================================
// Entity
// =============================================================================

/// Describes how one record type maps onto its table.
///
/// All names here are compile-time constants; they are the only strings
/// besides bound values that end up in generated SQL.
pub trait Entity: Sized + Send + Unpin + 'static {
    /// Name used in errors and logs.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Table alias used by `PROJECTION`, `JOINS` and list filters.
    const ALIAS: &'static str;
    /// Mutable columns, in insert order.
    const COLUMNS: &'static [&'static str];
    /// Columns a patch may touch.
    const PATCHABLE: &'static [&'static str] = Self::COLUMNS;
    /// Reference columns where an empty string means NULL.
    const NULLABLE: &'static [&'static str] = &[];
    /// Column matched by the list search filter.
    const SEARCH_COLUMN: &'static str = "name";
    /// Unicode-lowercased copy of `SEARCH_COLUMN`, kept current on every write.
    const SEARCH_FOLDED: &'static str = "name_folded";
    /// SELECT list, qualified with `ALIAS`.
    const PROJECTION: &'static str;
    /// Read-side joins appended after `FROM TABLE AS ALIAS`.
    const JOINS: &'static str = "";

    type Create: Validate + Send + Sync;
    type Update: Validate + Send + Sync;

    /// Values for every column in `COLUMNS`.
    fn create_fields(input: &Self::Create) -> FieldMap;

    fn update_key(input: &Self::Update) -> &str;

    /// Values for every column in `COLUMNS`.
    fn update_fields(input: &Self::Update) -> FieldMap;

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for one entity's table.
///
/// ## Usage
/// ```rust,ignore
/// let id = db.users().create(&CreateUser { name, phone }).await?;
/// let user = db.users().get_by_id(&id).await?;
/// ```
pub struct Repository<E> {
    pool: SqlitePool,
    binder: Binder,
    patcher: PatchBuilder,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Repository {
            pool: self.pool.clone(),
            binder: self.binder,
            patcher: self.patcher,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::NAME)
            .field("table", &E::TABLE)
            .finish()
    }
}

impl<E: Entity> Repository<E> {
    /// Creates a new repository over `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        Repository {
            pool,
            binder: Binder::new(Dialect::Sqlite),
            patcher: PatchBuilder::new(Dialect::Sqlite),
            _entity: PhantomData,
        }
    }

    /// Inserts a new record and returns its generated id.
    ///
    /// ## Errors
    /// * `Validation` - input rejected
    /// * `ForeignKeyViolation` - a reference points at a missing row
    pub async fn create(&self, input: &E::Create) -> DbResult<String> {
        input.validate()?;

        let id = generate_id();
        let mut fields = E::create_fields(input);
        fold_search_column::<E>(&mut fields);
        fields.insert(KEY_PARAM, id.as_str());

        let columns: Vec<&str> = std::iter::once(KEY_COLUMN)
            .chain(E::COLUMNS.iter().copied())
            .chain(std::iter::once(E::SEARCH_FOLDED))
            .collect();
        let placeholders: Vec<String> = std::iter::once(KEY_PARAM)
            .chain(E::COLUMNS.iter().copied())
            .chain(std::iter::once(E::SEARCH_FOLDED))
            .map(|name| format!(":{name}"))
            .collect();

        let template = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            columns.join(", "),
            placeholders.join(", ")
        );
        let bound = self.binder.bind(&template, &fields)?;

        prepare(&bound).execute(&self.pool).await?;

        debug!(entity = E::NAME, id = %id, "Created record");
        Ok(id)
    }

    /// Gets a record by its id.
    ///
    /// ## Errors
    /// * `NotFound` - no row has this id
    pub async fn get_by_id(&self, id: &str) -> DbResult<E> {
        let template = format!(
            "{} WHERE {}.{KEY_COLUMN} = :{KEY_PARAM}",
            select_clause::<E>(),
            E::ALIAS
        );
        let bound = self
            .binder
            .bind(&template, &FieldMap::new().with(KEY_PARAM, id))?;

        let row = prepare(&bound).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => Ok(E::decode(&row)?),
            None => Err(DbError::not_found(E::NAME, id)),
        }
    }

    /// Lists one page of records.
    ///
    /// ## How It Works
    /// 1. Non-empty `search` becomes a case-insensitive substring filter on
    ///    `SEARCH_COLUMN`; `%`, `_` and `\` in it match literally. Case is
    ///    folded in Rust (full Unicode) and matched against `SEARCH_FOLDED`,
    ///    since SQLite's `LOWER` only folds ASCII
    /// 2. `count` is taken over the filtered rows, ignoring offset and limit
    /// 3. The page is ordered by `created_at`, then `id`
    ///
    /// An offset past the end yields an empty page with the full count.
    pub async fn get_list(&self, request: &ListRequest) -> DbResult<ListResponse<E>> {
        let search = validate_search_query(&request.search)?;

        let mut params = FieldMap::new();
        let filter = if search.is_empty() {
            String::new()
        } else {
            params.insert("search", escape_like(&search.to_lowercase()));
            format!(
                r" WHERE {}.{} LIKE '%' || :search || '%' ESCAPE '\'",
                E::ALIAS,
                E::SEARCH_FOLDED
            )
        };

        let count_template = format!(
            "SELECT COUNT(*) FROM {} AS {}{filter}",
            E::TABLE,
            E::ALIAS
        );
        let count_bound = self.binder.bind(&count_template, &params)?;
        let count: i64 = prepare(&count_bound)
            .fetch_one(&self.pool)
            .await?
            .try_get(0usize)?;

        params.insert("limit", request.effective_limit());
        params.insert("offset", request.effective_offset());

        let page_template = format!(
            "{}{filter} ORDER BY {alias}.created_at, {alias}.{KEY_COLUMN} LIMIT :limit OFFSET :offset",
            select_clause::<E>(),
            alias = E::ALIAS
        );
        let page_bound = self.binder.bind(&page_template, &params)?;

        let rows = prepare(&page_bound).fetch_all(&self.pool).await?;
        let items = rows.iter().map(E::decode).collect::<Result<Vec<_>, _>>()?;

        debug!(
            entity = E::NAME,
            search = %search,
            count = count,
            returned = items.len(),
            "Listed records"
        );

        Ok(ListResponse { count, items })
    }

    /// Replaces every mutable column of a record.
    ///
    /// ## Returns
    /// Rows affected (always 1 on success).
    ///
    /// ## Errors
    /// * `Validation` - input rejected
    /// * `NoRowsAffected` - no row has this id
    pub async fn update(&self, input: &E::Update) -> DbResult<u64> {
        input.validate()?;

        let id = E::update_key(input);
        let mut fields = E::update_fields(input);
        fold_search_column::<E>(&mut fields);

        self.execute_update(id, &fields).await
    }

    /// Changes only the fields present in `request`.
    ///
    /// Fields are checked against `PATCHABLE` before any SQL is built, so
    /// an unknown or reserved column never reaches the database.
    ///
    /// ## Errors
    /// * `Query(UnknownField)` - field not patchable for this entity
    /// * `Query(EmptyPatch)` - no fields
    /// * `Validation` - a field value is rejected
    /// * `NoRowsAffected` - no row has this id
    pub async fn patch(&self, request: &PatchRequest) -> DbResult<u64> {
        let patch = PatchSet::from_fields(E::PATCHABLE, request.fields.clone())?;
        self.apply_patch(&request.id, patch).await
    }

    /// Patches a record from a JSON object body.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // PATCH /couriers/{id}  {"phone": "+1 555-0100"}
    /// db.couriers().patch_json(&id, &body).await?;
    /// ```
    pub async fn patch_json(
        &self,
        id: &str,
        body: &serde_json::Map<String, serde_json::Value>,
    ) -> DbResult<u64> {
        let patch = PatchSet::from_json(E::PATCHABLE, body)?;
        self.apply_patch(id, patch).await
    }

    async fn apply_patch(&self, id: &str, patch: PatchSet) -> DbResult<u64> {
        let fields = nullify_empty_references(patch.into_fields(), E::NULLABLE);
        let mut fields = trim_text_fields(fields);
        validate_fields(&fields)?;
        fold_search_column::<E>(&mut fields);

        self.execute_update(id, &fields).await
    }

    async fn execute_update(&self, id: &str, fields: &FieldMap) -> DbResult<u64> {
        let bound = self.patcher.build(E::TABLE, KEY_COLUMN, id, fields)?;

        let affected = prepare(&bound).execute(&self.pool).await?.rows_affected();

        debug!(
            entity = E::NAME,
            id = %id,
            fields = fields.len(),
            affected = affected,
            "Updated record"
        );

        if affected == 0 {
            return Err(DbError::no_rows_affected(E::NAME, id));
        }
        Ok(affected)
    }

    /// Deletes a record by id.
    ///
    /// Deleting an id that does not exist is not an error.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let template = format!("DELETE FROM {} WHERE {KEY_COLUMN} = :{KEY_PARAM}", E::TABLE);
        let bound = self
            .binder
            .bind(&template, &FieldMap::new().with(KEY_PARAM, id))?;

        let affected = prepare(&bound).execute(&self.pool).await?.rows_affected();

        debug!(entity = E::NAME, id = %id, affected = affected, "Deleted record");
        Ok(())
    }

    /// Counts all records in the table.
    pub async fn count(&self) -> DbResult<i64> {
        let bound = self
            .binder
            .bind(&format!("SELECT COUNT(*) FROM {}", E::TABLE), &FieldMap::new())?;

        let count: i64 = prepare(&bound).fetch_one(&self.pool).await?.try_get(0usize)?;
        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn select_clause<E: Entity>() -> String {
    let mut sql = format!("SELECT {} FROM {} AS {}", E::PROJECTION, E::TABLE, E::ALIAS);
    if !E::JOINS.is_empty() {
        sql.push(' ');
        sql.push_str(E::JOINS);
    }
    sql
}

/// Turns a bound query into an executable sqlx query, binding each argument
/// with its own SQLite type.
fn prepare(bound: &BoundQuery) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    let mut query = sqlx::query(bound.sql());

    for arg in bound.args() {
        query = match arg {
            Value::Text(text) => query.bind(text.as_str()),
            Value::Int(n) => query.bind(*n),
            Value::Float(f) => query.bind(*f),
            Value::Null => query.bind(None::<&str>),
            Value::OptText(text) => query.bind(text.as_deref()),
        };
    }

    query
}

/// Escapes LIKE wildcards so `term` matches literally under `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn nullify_empty_references(fields: FieldMap, nullable: &[&str]) -> FieldMap {
    fields
        .into_iter()
        .map(|(column, value)| match value {
            Value::Text(text) if text.is_empty() && nullable.contains(&column.as_str()) => {
                (column, Value::OptText(None))
            }
            other => (column, other),
        })
        .collect()
}

/// Trims `TRIMMED_COLUMNS` the same way the create and update mappings do.
fn trim_text_fields(fields: FieldMap) -> FieldMap {
    fields
        .into_iter()
        .map(|(column, value)| match value {
            Value::Text(text) if TRIMMED_COLUMNS.contains(&column.as_str()) => {
                let trimmed = text.trim().to_string();
                (column, Value::Text(trimmed))
            }
            other => (column, other),
        })
        .collect()
}

/// Adds `SEARCH_FOLDED` when `fields` sets `SEARCH_COLUMN`.
fn fold_search_column<E: Entity>(fields: &mut FieldMap) {
    let folded = match fields.get(E::SEARCH_COLUMN) {
        Some(Value::Text(text)) => text.to_lowercase(),
        _ => return,
    };
    fields.insert(E::SEARCH_FOLDED, folded);
}

/// Generates a new record id (UUID v4).
fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use dispatch_core::{CreateUser, QueryError, UpdateUser, User};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn ann() -> CreateUser {
        CreateUser {
            name: "Ann".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_nullify_empty_references() {
        let fields = FieldMap::new()
            .with("courier_id", "")
            .with("name", "");

        let fields = nullify_empty_references(fields, &["courier_id"]);

        assert_eq!(fields.get("courier_id"), Some(&Value::OptText(None)));
        assert_eq!(fields.get("name"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn test_trim_text_fields() {
        let fields = FieldMap::new()
            .with("name", "  Anna  ")
            .with("phone", " 555 ")
            .with("product_id", " p ");

        let fields = trim_text_fields(fields);

        assert_eq!(fields.get("name"), Some(&Value::Text("Anna".to_string())));
        assert_eq!(fields.get("phone"), Some(&Value::Text("555".to_string())));
        assert_eq!(fields.get("product_id"), Some(&Value::Text(" p ".to_string())));
    }

    #[test]
    fn test_fold_search_column() {
        let mut fields = FieldMap::new().with("name", "ШАХЗОД Ölçek");
        fold_search_column::<User>(&mut fields);
        assert_eq!(
            fields.get("name_folded"),
            Some(&Value::Text("шахзод ölçek".to_string()))
        );

        let mut phone_only = FieldMap::new().with("phone", "555");
        fold_search_column::<User>(&mut phone_only);
        assert!(!phone_only.contains_key("name_folded"));
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let db = test_db().await;

        let id = db.users().create(&ann()).await.unwrap();
        let user: User = db.users().get_by_id(&id).await.unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.name, "Ann");
        assert_eq!(user.phone, "555-0100");
        assert!(uuid::Uuid::parse_str(&user.id).is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = test_db().await;

        let err = db.users().get_by_id("no-such-id").await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { ref entity, ref id } if entity == "user" && id == "no-such-id"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = test_db().await;

        let err = db
            .users()
            .create(&CreateUser {
                name: "  ".to_string(),
                phone: "555".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(db.users().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_offset_past_end_keeps_count() {
        let db = test_db().await;
        for _ in 0..3 {
            db.users().create(&ann()).await.unwrap();
        }

        let page = db.users().get_list(&ListRequest::new(10, 5)).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.count, 3);
    }

    #[tokio::test]
    async fn test_search_offset_past_end_keeps_filtered_count() {
        let db = test_db().await;
        for _ in 0..3 {
            db.users().create(&ann()).await.unwrap();
        }
        db.users()
            .create(&CreateUser {
                name: "Bob".to_string(),
                phone: "555-0102".to_string(),
            })
            .await
            .unwrap();

        let page = db
            .users()
            .get_list(&ListRequest::new(10, 5).with_search("ann"))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.count, 3);
    }

    #[tokio::test]
    async fn test_list_count_is_total_not_page_size() {
        let db = test_db().await;
        for _ in 0..4 {
            db.users().create(&ann()).await.unwrap();
        }

        let page = db.users().get_list(&ListRequest::new(0, 3)).await.unwrap();

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.count, 4);
    }

    #[tokio::test]
    async fn test_list_defaults_to_ten_rows() {
        let db = test_db().await;
        for _ in 0..12 {
            db.users().create(&ann()).await.unwrap();
        }

        let page = db.users().get_list(&ListRequest::default()).await.unwrap();

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.count, 12);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let db = test_db().await;
        db.users().create(&ann()).await.unwrap();
        db.users()
            .create(&CreateUser {
                name: "Joanna".to_string(),
                phone: "555-0101".to_string(),
            })
            .await
            .unwrap();
        db.users()
            .create(&CreateUser {
                name: "Bob".to_string(),
                phone: "555-0102".to_string(),
            })
            .await
            .unwrap();

        let page = db
            .users()
            .get_list(&ListRequest::default().with_search("ANN"))
            .await
            .unwrap();

        assert_eq!(page.count, 2);
        assert!(page.items.iter().all(|u| u.name.to_lowercase().contains("ann")));
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        for (name, phone) in [("Шахзод", "555-0104"), ("Ölçek", "555-0105"), ("Ann", "555-0100")] {
            db.users()
                .create(&CreateUser {
                    name: name.to_string(),
                    phone: phone.to_string(),
                })
                .await
                .unwrap();
        }

        let cyrillic = db
            .users()
            .get_list(&ListRequest::default().with_search("шахзод"))
            .await
            .unwrap();
        assert_eq!(cyrillic.count, 1);
        assert_eq!(cyrillic.items[0].name, "Шахзод");

        let latin = db
            .users()
            .get_list(&ListRequest::default().with_search("ÖL"))
            .await
            .unwrap();
        assert_eq!(latin.count, 1);
        assert_eq!(latin.items[0].name, "Ölçek");
    }

    #[tokio::test]
    async fn test_patched_name_is_searchable_by_new_name() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();

        let request = PatchRequest::new(id, FieldMap::new().with("name", "Дилноза"));
        db.users().patch(&request).await.unwrap();

        let old = db
            .users()
            .get_list(&ListRequest::default().with_search("ann"))
            .await
            .unwrap();
        let new = db
            .users()
            .get_list(&ListRequest::default().with_search("ДИЛ"))
            .await
            .unwrap();
        assert_eq!(old.count, 0);
        assert_eq!(new.count, 1);
    }

    #[tokio::test]
    async fn test_search_with_quotes_matches_literally() {
        let db = test_db().await;
        db.users()
            .create(&CreateUser {
                name: "O'Brien".to_string(),
                phone: "555-0103".to_string(),
            })
            .await
            .unwrap();
        db.users().create(&ann()).await.unwrap();

        let hostile = db
            .users()
            .get_list(&ListRequest::default().with_search("x' OR '1'='1"))
            .await
            .unwrap();
        assert_eq!(hostile.count, 0);
        assert!(hostile.items.is_empty());

        let quoted = db
            .users()
            .get_list(&ListRequest::default().with_search("o'b"))
            .await
            .unwrap();
        assert_eq!(quoted.count, 1);
        assert_eq!(quoted.items[0].name, "O'Brien");

        // Wildcards in the term are literal.
        let wildcard = db
            .users()
            .get_list(&ListRequest::default().with_search("%"))
            .await
            .unwrap();
        assert_eq!(wildcard.count, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_mutable_columns() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();
        let before = db.users().get_by_id(&id).await.unwrap();

        let affected = db
            .users()
            .update(&UpdateUser {
                id: id.clone(),
                name: "Anne".to_string(),
                phone: "555-0199".to_string(),
            })
            .await
            .unwrap();

        let after = db.users().get_by_id(&id).await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(after.name, "Anne");
        assert_eq!(after.phone, "555-0199");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_no_rows_affected() {
        let db = test_db().await;

        let err = db
            .users()
            .update(&UpdateUser {
                id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
                name: "Ghost".to_string(),
                phone: "555".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NoRowsAffected { .. }));
    }

    #[tokio::test]
    async fn test_patch_touches_only_given_fields() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();

        let request = PatchRequest::new(id.clone(), FieldMap::new().with("phone", "555-0142"));
        db.users().patch(&request).await.unwrap();

        let user = db.users().get_by_id(&id).await.unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(user.phone, "555-0142");
    }

    #[tokio::test]
    async fn test_patch_trims_like_create() {
        let db = test_db().await;
        let id = db
            .users()
            .create(&CreateUser {
                name: "  Ann  ".to_string(),
                phone: "555-0100".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(db.users().get_by_id(&id).await.unwrap().name, "Ann");

        let request = PatchRequest::new(
            id.clone(),
            FieldMap::new().with("name", "  Anna  ").with("phone", " 555-0142 "),
        );
        db.users().patch(&request).await.unwrap();

        let user = db.users().get_by_id(&id).await.unwrap();
        assert_eq!(user.name, "Anna");
        assert_eq!(user.phone, "555-0142");
    }

    #[tokio::test]
    async fn test_patch_whitespace_name_is_rejected() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();

        let request = PatchRequest::new(id.clone(), FieldMap::new().with("name", "   "));
        let err = db.users().patch(&request).await.unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(db.users().get_by_id(&id).await.unwrap().name, "Ann");
    }

    #[tokio::test]
    async fn test_same_patch_twice_affects_one_row_each_time() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();
        let request = PatchRequest::new(id, FieldMap::new().with("name", "Anna"));

        assert_eq!(db.users().patch(&request).await.unwrap(), 1);
        assert_eq!(db.users().patch(&request).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_patch_missing_row_is_no_rows_affected() {
        let db = test_db().await;
        let request = PatchRequest::new("missing", FieldMap::new().with("name", "Anna"));

        let err = db.users().patch(&request).await.unwrap_err();

        assert!(matches!(err, DbError::NoRowsAffected { ref id, .. } if id == "missing"));
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();

        let err = db
            .users()
            .patch(&PatchRequest::new(id, FieldMap::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Query(QueryError::EmptyPatch)));
    }

    #[tokio::test]
    async fn test_patch_rejects_fields_outside_allow_list() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();

        for field in ["id", "created_at", "is_admin"] {
            let request = PatchRequest::new(id.clone(), FieldMap::new().with(field, "x"));
            let err = db.users().patch(&request).await.unwrap_err();
            assert!(
                matches!(err, DbError::Query(QueryError::UnknownField { .. })),
                "{field} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_patch_json_body() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();

        let body = match serde_json::json!({ "name": "Annie" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        db.users().patch_json(&id, &body).await.unwrap();

        assert_eq!(db.users().get_by_id(&id).await.unwrap().name, "Annie");
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_is_quiet_when_missing() {
        let db = test_db().await;
        let id = db.users().create(&ann()).await.unwrap();

        db.users().delete(&id).await.unwrap();
        db.users().delete(&id).await.unwrap();

        assert!(matches!(
            db.users().get_by_id(&id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
