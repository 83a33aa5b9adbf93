//! # Validation Module
//!
//! Input validation for create and update payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request decoding (serde)                                     │
//! │  └── Types and required keys                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Lengths, formats, ranges (Validate trait)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dispatch_core::validation::{validate_name, validate_phone};
//!
//! validate_name("Ann").unwrap();
//! validate_phone("+1 555-0100").unwrap();
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{
    CreateCategory, CreateCourier, CreateCustomer, CreateOrder, CreateProduct, CreateUser,
    UpdateCategory, UpdateCourier, UpdateCustomer, UpdateOrder, UpdateProduct, UpdateUser,
};
use crate::value::{FieldMap, Value};
use crate::MAX_ORDER_QUANTITY;

/// Maximum length of a name column.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a phone number.
pub const MAX_PHONE_LEN: usize = 20;

/// Maximum length of a list search term.
pub const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// Validate Trait
// =============================================================================

/// Implemented by every create/update payload.
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Digits, spaces, hyphens, parentheses and a leading `+`
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let well_formed = digits
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
        && digits.chars().any(|c| c.is_ascii_digit());

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain digits, spaces, hyphens or parentheses".to_string(),
        });
    }

    Ok(())
}

/// Validates a list search term.
///
/// ## Returns
/// The trimmed term.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order quantity (1..=MAX_ORDER_QUANTITY).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ORDER_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ORDER_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed, negative and non-finite values are not.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use dispatch_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates a reference id that may be empty (stored as NULL).
pub fn validate_optional_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Ok(());
    }
    validate_uuid(field, id)
}

// =============================================================================
// Field Map Validation
// =============================================================================

/// Validates the known columns of a partial update.
///
/// Columns this module has no rule for are accepted as-is; which columns may
/// be patched at all is decided by the entity's allow-list.
pub fn validate_fields(fields: &FieldMap) -> ValidationResult<()> {
    for (column, value) in fields {
        match (column.as_str(), value) {
            ("name", Value::Text(name)) => validate_name(name)?,
            ("phone", Value::Text(phone)) => validate_phone(phone)?,
            ("name" | "phone", Value::Null | Value::OptText(None)) => {
                return Err(ValidationError::Required {
                    field: column.to_string(),
                })
            }
            ("name" | "phone", _) => return Err(invalid(column, "must be text")),
            ("price", Value::Float(price)) => validate_price(*price)?,
            ("price", Value::Int(price)) => validate_price(*price as f64)?,
            ("price", _) => return Err(invalid(column, "must be a number")),
            ("quantity", Value::Int(qty)) => validate_quantity(*qty)?,
            ("quantity", _) => return Err(invalid(column, "must be an integer")),
            (reference, Value::Text(id) | Value::OptText(Some(id)))
                if reference.ends_with("_id") =>
            {
                validate_optional_uuid(reference, id)?
            }
            _ => {}
        }
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Payload Implementations
// =============================================================================

fn validate_contact(name: &str, phone: &str) -> ValidationResult<()> {
    validate_name(name)?;
    validate_phone(phone)
}

impl Validate for CreateUser {
    fn validate(&self) -> ValidationResult<()> {
        validate_contact(&self.name, &self.phone)
    }
}

impl Validate for UpdateUser {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_contact(&self.name, &self.phone)
    }
}

impl Validate for CreateCustomer {
    fn validate(&self) -> ValidationResult<()> {
        validate_contact(&self.name, &self.phone)
    }
}

impl Validate for UpdateCustomer {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_contact(&self.name, &self.phone)
    }
}

impl Validate for CreateCourier {
    fn validate(&self) -> ValidationResult<()> {
        validate_contact(&self.name, &self.phone)
    }
}

impl Validate for UpdateCourier {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_contact(&self.name, &self.phone)
    }
}

impl Validate for CreateCategory {
    fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)
    }
}

impl Validate for UpdateCategory {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_name(&self.name)
    }
}

impl Validate for CreateProduct {
    fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_optional_uuid("category_id", &self.category_id)
    }
}

impl Validate for UpdateProduct {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_optional_uuid("category_id", &self.category_id)
    }
}

fn validate_order_references(
    user_id: &str,
    customer_id: &str,
    product_id: &str,
    courier_id: &str,
) -> ValidationResult<()> {
    validate_optional_uuid("user_id", user_id)?;
    validate_optional_uuid("customer_id", customer_id)?;
    validate_optional_uuid("product_id", product_id)?;
    validate_optional_uuid("courier_id", courier_id)
}

impl Validate for CreateOrder {
    fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_quantity(self.quantity)?;
        validate_order_references(
            &self.user_id,
            &self.customer_id,
            &self.product_id,
            &self.courier_id,
        )
    }
}

impl Validate for UpdateOrder {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_name(&self.name)?;
        validate_quantity(self.quantity)?;
        validate_order_references(
            &self.user_id,
            &self.customer_id,
            &self.product_id,
            &self.courier_id,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
