//! # Record Types
//!
//! Read models, create/update payloads and list envelopes for the six
//! entities.
//!
//! ## Entity Relations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐        ┌──────────┐                                       │
//! │  │ Category │◄───────│ Product  │                                       │
//! │  └──────────┘  0..1  └────▲─────┘                                       │
//! │                           │ 0..1                                        │
//! │  ┌──────────┐  0..1  ┌────┴─────┐  0..1  ┌──────────┐                   │
//! │  │   User   │◄───────│  Order   │───────►│ Customer │                   │
//! │  └──────────┘        └────┬─────┘        └──────────┘                   │
//! │                           │ 0..1                                        │
//! │                      ┌────▼─────┐                                       │
//! │                      │ Courier  │                                       │
//! │                      └──────────┘                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every record has a UUID v4 `id` assigned on create, plus `created_at` and
//! `updated_at`. References are nullable; an empty id in a payload is stored
//! as NULL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_LIMIT, DEFAULT_OFFSET};

// =============================================================================
// Embedded Display Fields
// =============================================================================

/// Name and phone of a related person (user, customer or courier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactRef {
    pub name: String,
    pub phone: String,
}

/// Name of the category a product belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryRef {
    pub name: String,
}

/// Name and unit price of the product an order is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRef {
    pub name: String,
    pub price: f64,
}

// =============================================================================
// User
// =============================================================================

/// A staff user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateUser {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateUser {
    pub id: String,
    pub name: String,
    pub phone: String,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer placing orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateCustomer {
    pub id: String,
    pub name: String,
    pub phone: String,
}

// =============================================================================
// Courier
// =============================================================================

/// A courier delivering orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Courier {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateCourier {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateCourier {
    pub id: String,
    pub name: String,
    pub phone: String,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateCategory {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category_id: Option<String>,
    /// Joined from `categories` at read time.
    pub category: Option<CategoryRef>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateProduct {
    pub name: String,
    pub price: f64,
    /// Empty string means "no category".
    #[serde(default)]
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category_id: String,
}

// =============================================================================
// Order
// =============================================================================

/// An order, denormalised with display fields of its related records.
///
/// ## Read-Side Projection
/// ```text
/// orders o
///   LEFT JOIN users     → user     { name, phone }
///   LEFT JOIN customers → customer { name, phone }
///   LEFT JOIN couriers  → courier  { name, phone }
///   LEFT JOIN products  → product  { name, price }
///                         product_price = p.price
///                         total_price   = p.price × o.quantity
/// ```
/// None of the joined fields are written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub user_id: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub courier_id: Option<String>,
    pub product_price: Option<f64>,
    pub total_price: Option<f64>,
    pub user: Option<ContactRef>,
    pub customer: Option<ContactRef>,
    pub courier: Option<ContactRef>,
    pub product: Option<ProductRef>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateOrder {
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub courier_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateOrder {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub courier_id: String,
}

// =============================================================================
// Listing
// =============================================================================

/// Offset/limit page request with an optional name filter.
///
/// Non-positive `offset` / `limit` fall back to [`DEFAULT_OFFSET`] /
/// [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListRequest {
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
    /// Case-insensitive substring matched against the entity's name column.
    #[serde(default)]
    pub search: String,
}

impl ListRequest {
    pub fn new(offset: i64, limit: i64) -> Self {
        ListRequest {
            offset,
            limit,
            search: String::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn effective_offset(&self) -> i64 {
        if self.offset > 0 {
            self.offset
        } else {
            DEFAULT_OFFSET
        }
    }

    pub fn effective_limit(&self) -> i64 {
        if self.limit > 0 {
            self.limit
        } else {
            DEFAULT_LIMIT
        }
    }
}

/// One page of records plus the total number of matching records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ListResponse<T> {
    /// Rows matching the filter, ignoring offset and limit.
    pub count: i64,
    pub items: Vec<T>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request_defaults() {
        let req = ListRequest::default();
        assert_eq!(req.effective_offset(), DEFAULT_OFFSET);
        assert_eq!(req.effective_limit(), DEFAULT_LIMIT);

        let req = ListRequest::new(-5, 0);
        assert_eq!(req.effective_offset(), 0);
        assert_eq!(req.effective_limit(), 10);

        let req = ListRequest::new(20, 50);
        assert_eq!(req.effective_offset(), 20);
        assert_eq!(req.effective_limit(), 50);
    }

    #[test]
    fn test_create_order_reference_ids_default_to_empty() {
        let req: CreateOrder =
            serde_json::from_str(r#"{"name": "Lunch", "quantity": 2}"#).unwrap();

        assert_eq!(req.quantity, 2);
        assert!(req.user_id.is_empty());
        assert!(req.courier_id.is_empty());
    }
}
