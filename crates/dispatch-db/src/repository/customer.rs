//! # Customer Repository
//!
//! Customers who place orders.

use dispatch_core::{CreateCustomer, Customer, FieldMap, UpdateCustomer};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Entity, Repository};

/// Repository for the `customers` table.
pub type CustomerRepository = Repository<Customer>;

impl Entity for Customer {
    const NAME: &'static str = "customer";
    const TABLE: &'static str = "customers";
    const ALIAS: &'static str = "cu";
    const COLUMNS: &'static [&'static str] = &["name", "phone"];
    const PROJECTION: &'static str =
        "cu.id, cu.name, cu.phone, cu.created_at, cu.updated_at";

    type Create = CreateCustomer;
    type Update = UpdateCustomer;

    fn create_fields(input: &CreateCustomer) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("phone", input.phone.trim())
    }

    fn update_key(input: &UpdateCustomer) -> &str {
        &input.id
    }

    fn update_fields(input: &UpdateCustomer) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("phone", input.phone.trim())
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
