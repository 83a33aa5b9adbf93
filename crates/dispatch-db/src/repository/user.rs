//! # User Repository
//!
//! Staff users: a name and a phone number.

use dispatch_core::{CreateUser, FieldMap, UpdateUser, User};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Entity, Repository};

/// Repository for the `users` table.
pub type UserRepository = Repository<User>;

impl Entity for User {
    const NAME: &'static str = "user";
    const TABLE: &'static str = "users";
    const ALIAS: &'static str = "u";
    const COLUMNS: &'static [&'static str] = &["name", "phone"];
    const PROJECTION: &'static str = "u.id, u.name, u.phone, u.created_at, u.updated_at";

    type Create = CreateUser;
    type Update = UpdateUser;

    fn create_fields(input: &CreateUser) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("phone", input.phone.trim())
    }

    fn update_key(input: &UpdateUser) -> &str {
        &input.id
    }

    fn update_fields(input: &UpdateUser) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("phone", input.phone.trim())
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(User {
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
    use crate::{Database, DbConfig};
    use dispatch_core::CreateUser;

    #[tokio::test]
    async fn test_create_trims_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let id = db
            .users()
            .create(&CreateUser {
                name: "  Dilnoza ".to_string(),
                phone: " +998 90 123 45 67 ".to_string(),
            })
            .await
            .unwrap();

        let user = db.users().get_by_id(&id).await.unwrap();
        assert_eq!(user.name, "Dilnoza");
        assert_eq!(user.phone, "+998 90 123 45 67");
        assert_eq!(user.created_at, user.updated_at);
    }
}
