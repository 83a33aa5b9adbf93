//! # Courier Repository
//!
//! Couriers who deliver orders.

use dispatch_core::{CreateCourier, Courier, FieldMap, UpdateCourier};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Entity, Repository};

/// Repository for the `couriers` table.
pub type CourierRepository = Repository<Courier>;

impl Entity for Courier {
    const NAME: &'static str = "courier";
    const TABLE: &'static str = "couriers";
    const ALIAS: &'static str = "co";
    const COLUMNS: &'static [&'static str] = &["name", "phone"];
    const PROJECTION: &'static str =
        "co.id, co.name, co.phone, co.created_at, co.updated_at";

    type Create = CreateCourier;
    type Update = UpdateCourier;

    fn create_fields(input: &CreateCourier) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("phone", input.phone.trim())
    }

    fn update_key(input: &UpdateCourier) -> &str {
        &input.id
    }

    fn update_fields(input: &UpdateCourier) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("phone", input.phone.trim())
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Courier {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use dispatch_core::{CreateCourier, FieldMap, PatchRequest, ValidationError};

    #[tokio::test]
    async fn test_patch_phone_keeps_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db
            .couriers()
            .create(&CreateCourier {
                name: "Rustam".to_string(),
                phone: "555-0100".to_string(),
            })
            .await
            .unwrap();

        let affected = db
            .couriers()
            .patch(&PatchRequest::new(id.clone(), FieldMap::new().with("phone", "555-0199")))
            .await
            .unwrap();

        let courier = db.couriers().get_by_id(&id).await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(courier.name, "Rustam");
        assert_eq!(courier.phone, "555-0199");
    }

    #[tokio::test]
    async fn test_patch_rejects_bad_phone() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db
            .couriers()
            .create(&CreateCourier {
                name: "Rustam".to_string(),
                phone: "555-0100".to_string(),
            })
            .await
            .unwrap();

        let err = db
            .couriers()
            .patch(&PatchRequest::new(id, FieldMap::new().with("phone", "call me")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Validation(ValidationError::InvalidFormat { ref field, .. }) if field == "phone"
        ));
    }
}
