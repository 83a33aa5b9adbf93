//! # Category Repository
//!
//! Product categories. Deleting a category leaves its products uncategorised.

use dispatch_core::{Category, CreateCategory, FieldMap, UpdateCategory};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Entity, Repository};

/// Repository for the `categories` table.
pub type CategoryRepository = Repository<Category>;

impl Entity for Category {
    const NAME: &'static str = "category";
    const TABLE: &'static str = "categories";
    const ALIAS: &'static str = "c";
    const COLUMNS: &'static [&'static str] = &["name"];
    const PROJECTION: &'static str = "c.id, c.name, c.created_at, c.updated_at";

    type Create = CreateCategory;
    type Update = UpdateCategory;

    fn create_fields(input: &CreateCategory) -> FieldMap {
        FieldMap::new().with("name", input.name.trim())
    }

    fn update_key(input: &UpdateCategory) -> &str {
        &input.id
    }

    fn update_fields(input: &UpdateCategory) -> FieldMap {
        FieldMap::new().with("name", input.name.trim())
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
