//! # dispatch-db: Database Layer for Dispatch
//!
//! This crate provides storage for users, customers, couriers, categories,
//! products and orders. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dispatch Data Flow                               │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI, seed binary)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   dispatch-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository<E>│    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │   × 6 entity  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ users, orders │    │ 001_init.sql │  │   │
//! │  │   │ DbConfig      │    │ products, ... │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ templates + field maps        │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │                  dispatch-core (Binder, PatchBuilder)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Pool configuration and environment loading
//! - [`pool`] - Connection pool and the `Database` facade
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Database error types
//! - [`repository`] - The generic repository and the six entity mappings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dispatch_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let page = db.orders().get_list(&ListRequest::new(0, 20)).await?;
//! println!("{} orders in total", page.count);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;

pub use repository::category::CategoryRepository;
pub use repository::courier::CourierRepository;
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
pub use repository::{Entity, Repository};
