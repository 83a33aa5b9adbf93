//! # dispatch-core: Query Construction for Dispatch
//!
//! This crate is the **heart** of Dispatch. It turns repository-authored
//! templates and caller-supplied field sets into executable statements, with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dispatch Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ dispatch-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  binder   │  │   patch   │  │   types   │  │ validation│  │   │
//! │  │   │ :name →?N │  │ SET only  │  │ User ...  │  │  payload  │  │   │
//! │  │   │           │  │  changed  │  │  Order    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ BoundQuery { sql, args }              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    dispatch-db (Database Layer)                 │   │
//! │  │              SQLite pool, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`value`] - Parameter values and field maps
//! - [`binder`] - Named → positional placeholder rewriting
//! - [`patch`] - Partial-update statements and allow-listed patch sets
//! - [`types`] - Record models and payloads
//! - [`validation`] - Payload validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use dispatch_core::{build_patch, FieldMap};
//!
//! let fields = FieldMap::new().with("phone", "555-0100");
//! let bound = build_patch("couriers", "id", "c-1", &fields).unwrap();
//!
//! // Only `phone` and the timestamp are touched, the key is a parameter.
//! assert!(bound.sql().starts_with("UPDATE couriers SET phone = ?1, updated_at = "));
//! assert_eq!(bound.args().len(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod binder;
pub mod error;
pub mod patch;
pub mod types;
pub mod validation;
pub mod value;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use binder::{bind, Binder, BoundQuery, Dialect};
pub use error::{QueryError, QueryResult, ValidationError, ValidationResult};
pub use patch::{build_patch, is_identifier, PatchBuilder, PatchRequest, PatchSet};
pub use types::*;
pub use validation::Validate;
pub use value::{FieldMap, Value};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Placeholder name the primary key is bound under in keyed statements.
pub const KEY_PARAM: &str = "id";

/// Column touched by every update and patch.
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Page size used when a list request gives no positive limit.
pub const DEFAULT_LIMIT: i64 = 10;

/// Offset used when a list request gives no positive offset.
pub const DEFAULT_OFFSET: i64 = 0;

/// Maximum quantity of a single order.
pub const MAX_ORDER_QUANTITY: i64 = 9_999;
