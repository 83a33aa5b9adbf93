//! # Order Repository
//!
//! Orders reference a user, a customer, a product and a courier, each
//! optional. Reads denormalise the display fields of those records.
//!
//! ## Read Projection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders o                                                               │
//! │    LEFT JOIN users     u  ON u.id  = o.user_id     → user {name, phone} │
//! │    LEFT JOIN customers cu ON cu.id = o.customer_id → customer {..}      │
//! │    LEFT JOIN products  p  ON p.id  = o.product_id  → product {name,     │
//! │                                                       price}            │
//! │    LEFT JOIN couriers  co ON co.id = o.courier_id  → courier {..}       │
//! │                                                                         │
//! │  product_price = p.price                                                │
//! │  total_price   = p.price * o.quantity                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The joined fields are read-only; writes touch `orders` alone.

use dispatch_core::{ContactRef, CreateOrder, FieldMap, Order, ProductRef, UpdateOrder, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Entity, Repository};

/// Repository for the `orders` table.
pub type OrderRepository = Repository<Order>;

const REFERENCES: &[&str] = &["user_id", "customer_id", "product_id", "courier_id"];

impl Entity for Order {
    const NAME: &'static str = "order";
    const TABLE: &'static str = "orders";
    const ALIAS: &'static str = "o";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "quantity",
        "user_id",
        "customer_id",
        "product_id",
        "courier_id",
    ];
    const NULLABLE: &'static [&'static str] = REFERENCES;
    const PROJECTION: &'static str = "o.id, o.name, o.quantity, \
         o.user_id, o.customer_id, o.product_id, o.courier_id, \
         u.name AS user_name, u.phone AS user_phone, \
         cu.name AS customer_name, cu.phone AS customer_phone, \
         co.name AS courier_name, co.phone AS courier_phone, \
         p.name AS product_name, p.price AS product_price, \
         p.price * o.quantity AS total_price, \
         o.created_at, o.updated_at";
    const JOINS: &'static str = "LEFT JOIN users AS u ON u.id = o.user_id \
         LEFT JOIN customers AS cu ON cu.id = o.customer_id \
         LEFT JOIN products AS p ON p.id = o.product_id \
         LEFT JOIN couriers AS co ON co.id = o.courier_id";

    type Create = CreateOrder;
    type Update = UpdateOrder;

    fn create_fields(input: &CreateOrder) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("quantity", input.quantity)
            .with("user_id", Value::nullable_text(&input.user_id))
            .with("customer_id", Value::nullable_text(&input.customer_id))
            .with("product_id", Value::nullable_text(&input.product_id))
            .with("courier_id", Value::nullable_text(&input.courier_id))
    }

    fn update_key(input: &UpdateOrder) -> &str {
        &input.id
    }

    fn update_fields(input: &UpdateOrder) -> FieldMap {
        FieldMap::new()
            .with("name", input.name.trim())
            .with("quantity", input.quantity)
            .with("user_id", Value::nullable_text(&input.user_id))
            .with("customer_id", Value::nullable_text(&input.customer_id))
            .with("product_id", Value::nullable_text(&input.product_id))
            .with("courier_id", Value::nullable_text(&input.courier_id))
    }

    fn decode(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let product_name: Option<String> = row.try_get("product_name")?;
        let product_price: Option<f64> = row.try_get("product_price")?;

        Ok(Order {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            quantity: row.try_get("quantity")?,
            user_id: row.try_get("user_id")?,
            customer_id: row.try_get("customer_id")?,
            product_id: row.try_get("product_id")?,
            courier_id: row.try_get("courier_id")?,
            product_price,
            total_price: row.try_get("total_price")?,
            user: contact(row, "user")?,
            customer: contact(row, "customer")?,
            courier: contact(row, "courier")?,
            product: product_name.map(|name| ProductRef {
                name,
                price: product_price.unwrap_or_default(),
            }),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Reads `<prefix>_name` / `<prefix>_phone`; None when the join found no row.
fn contact(row: &SqliteRow, prefix: &str) -> Result<Option<ContactRef>, sqlx::Error> {
    let name: Option<String> = row.try_get(format!("{prefix}_name").as_str())?;
    let phone: Option<String> = row.try_get(format!("{prefix}_phone").as_str())?;

    Ok(name.map(|name| ContactRef {
        name,
        phone: phone.unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use dispatch_core::{
        CreateCourier, CreateCustomer, CreateOrder, CreateProduct, CreateUser, FieldMap,
        PatchRequest, UpdateOrder,
    };

    struct Fixture {
        db: Database,
        user_id: String,
        customer_id: String,
        product_id: String,
        courier_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user_id = db
            .users()
            .create(&CreateUser {
                name: "Operator".to_string(),
                phone: "555-0001".to_string(),
            })
            .await
            .unwrap();
        let customer_id = db
            .customers()
            .create(&CreateCustomer {
                name: "Kamola".to_string(),
                phone: "555-0002".to_string(),
            })
            .await
            .unwrap();
        let product_id = db
            .products()
            .create(&CreateProduct {
                name: "Plov".to_string(),
                price: 4.5,
                category_id: String::new(),
            })
            .await
            .unwrap();
        let courier_id = db
            .couriers()
            .create(&CreateCourier {
                name: "Sardor".to_string(),
                phone: "555-0003".to_string(),
            })
            .await
            .unwrap();

        Fixture {
            db,
            user_id,
            customer_id,
            product_id,
            courier_id,
        }
    }

    fn lunch(f: &Fixture) -> CreateOrder {
        CreateOrder {
            name: "Lunch".to_string(),
            quantity: 2,
            user_id: f.user_id.clone(),
            customer_id: f.customer_id.clone(),
            product_id: f.product_id.clone(),
            courier_id: f.courier_id.clone(),
        }
    }

    #[tokio::test]
    async fn test_order_denormalises_related_records() {
        let f = fixture().await;
        let id = f.db.orders().create(&lunch(&f)).await.unwrap();

        let order = f.db.orders().get_by_id(&id).await.unwrap();

        assert_eq!(order.quantity, 2);
        assert_eq!(order.user.as_ref().map(|u| u.name.as_str()), Some("Operator"));
        assert_eq!(order.customer.as_ref().map(|c| c.phone.as_str()), Some("555-0002"));
        assert_eq!(order.courier.as_ref().map(|c| c.name.as_str()), Some("Sardor"));
        assert_eq!(order.product.as_ref().map(|p| p.price), Some(4.5));
        assert_eq!(order.product_price, Some(4.5));
        assert_eq!(order.total_price, Some(9.0));
    }

    #[tokio::test]
    async fn test_order_without_references() {
        let f = fixture().await;
        let id = f
            .db
            .orders()
            .create(&CreateOrder {
                name: "Walk-in".to_string(),
                quantity: 1,
                user_id: String::new(),
                customer_id: String::new(),
                product_id: String::new(),
                courier_id: String::new(),
            })
            .await
            .unwrap();

        let order = f.db.orders().get_by_id(&id).await.unwrap();

        assert_eq!(order.user, None);
        assert_eq!(order.courier, None);
        assert_eq!(order.product, None);
        assert_eq!(order.total_price, None);
    }

    #[tokio::test]
    async fn test_patch_quantity_updates_total() {
        let f = fixture().await;
        let id = f.db.orders().create(&lunch(&f)).await.unwrap();

        f.db.orders()
            .patch(&PatchRequest::new(id.clone(), FieldMap::new().with("quantity", 3)))
            .await
            .unwrap();

        let order = f.db.orders().get_by_id(&id).await.unwrap();
        assert_eq!(order.total_price, Some(13.5));
        assert_eq!(order.courier_id.as_deref(), Some(f.courier_id.as_str()));
    }

    #[tokio::test]
    async fn test_update_can_unassign_courier() {
        let f = fixture().await;
        let id = f.db.orders().create(&lunch(&f)).await.unwrap();

        f.db.orders()
            .update(&UpdateOrder {
                id: id.clone(),
                name: "Lunch".to_string(),
                quantity: 2,
                user_id: f.user_id.clone(),
                customer_id: f.customer_id.clone(),
                product_id: f.product_id.clone(),
                courier_id: String::new(),
            })
            .await
            .unwrap();

        let order = f.db.orders().get_by_id(&id).await.unwrap();
        assert_eq!(order.courier_id, None);
        assert_eq!(order.courier, None);
    }

    #[tokio::test]
    async fn test_delete_order_leaves_product() {
        let f = fixture().await;
        let id = f.db.orders().create(&lunch(&f)).await.unwrap();

        f.db.orders().delete(&id).await.unwrap();

        assert_eq!(f.db.orders().count().await.unwrap(), 0);
        assert_eq!(f.db.products().count().await.unwrap(), 1);
        assert!(f.db.products().get_by_id(&f.product_id).await.is_ok());
    }
}
