//! # Product Repository
//!
//! Products with a price and an optional category.
//!
//! ## Read Projection
//! ```text
//! products p
//!   LEFT JOIN categories c ON c.id = p.category_id
//!       → category { name }   (None when uncategorised)
//! ```

use dispatch_core::{CategoryRef, CreateProduct, FieldMap, Product, UpdateProduct, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Entity, Repository};

/// Repository for the `products` table.
pub type ProductRepository = Repository<Product>;

impl Entity for Product {
    const NAME: &'static str = "product";
    const TABLE: &'static str = "products";
    const ALIAS: &'static str = "p";
    const COLUMNS: &'static [&'static str] = &["name", "price", "category_id"];
    const NULLABLE: &'static [&'static str] = &["category_id"];
    const PROJECTION: &'static str = "p.id, p.name, p.price, p.category_id, \
         c.name AS category_name, p.created_at, p.updated_at";
    const JOINS: &'static str = "LEFT JOIN categories AS c ON c.id = p.category_id";

    type Create = CreateProduct;
    type Update = UpdateProduct;

    fn create_fields(input: &CreateProduct) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("price", input.price)
            .with("category_id", Value::nullable_text(&input.category_id))
    }

    fn update_key(input: &UpdateProduct) -> &str {
        &input.id
    }

    fn update_fields(input: &UpdateProduct) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("price", input.price)
            .with("category_id", Value::nullable_text(&input.category_id))
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let category_name: Option<String> = row.try_get("category_name")?;

        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            category_id: row.try_get("category_id")?,
            category: category_name.map(|name| CategoryRef { name }),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
