//! # Database Pool Management
//!
//! Connection pool creation and the storage facade.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Database (facade)                              │
//! │                                                                         │
//! │   users()  customers()  couriers()  categories()  products()  orders() │
//! │      │          │           │            │            │          │     │
//! │      └──────────┴───────────┴─────┬──────┴────────────┴──────────┘     │
//! │                                   │  built on first use, then reused   │
//! │                                   ▼                                     │
//! │                         SqlitePool (max_connections)                    │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                          SQLite file (WAL mode)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::courier::CourierRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;
use crate::repository::Repository;

/// Main database handle providing repository access.
///
/// Cloning is cheap: the pool is reference counted. Repositories are built
/// lazily per handle and share its pool.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::from_env()?).await?;
///
/// let id = db.couriers().create(&CreateCourier { name, phone }).await?;
/// db.couriers().patch(&PatchRequest::new(id, fields)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
    users: OnceLock<UserRepository>,
    customers: OnceLock<CustomerRepository>,
    couriers: OnceLock<CourierRepository>,
    categories: OnceLock<CategoryRepository>,
    products: OnceLock<ProductRepository>,
    orders: OnceLock<OrderRepository>,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path creates the file if it doesn't exist
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default; ON DELETE SET NULL needs them
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database::from_pool(pool);

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Wraps an existing pool. Migrations are not run.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Database {
            pool,
            users: OnceLock::new(),
            customers: OnceLock::new(),
            couriers: OnceLock::new(),
            categories: OnceLock::new(),
            products: OnceLock::new(),
            orders: OnceLock::new(),
        }
    }

    /// Runs database migrations.
    ///
    /// Called by `new()` when `run_migrations` is set; idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the user repository.
    pub fn users(&self) -> &UserRepository {
        self.repository(&self.users)
    }

    /// Returns the customer repository.
    pub fn customers(&self) -> &CustomerRepository {
        self.repository(&self.customers)
    }

    /// Returns the courier repository.
    pub fn couriers(&self) -> &CourierRepository {
        self.repository(&self.couriers)
    }

    /// Returns the category repository.
    pub fn categories(&self) -> &CategoryRepository {
        self.repository(&self.categories)
    }

    /// Returns the product repository.
    pub fn products(&self) -> &ProductRepository {
        self.repository(&self.products)
    }

    /// Returns the order repository.
    pub fn orders(&self) -> &OrderRepository {
        self.repository(&self.orders)
    }

    fn repository<'a, E>(&'a self, slot: &'a OnceLock<Repository<E>>) -> &'a Repository<E>
    where
        E: crate::repository::Entity,
    {
        slot.get_or_init(|| Repository::new(self.pool.clone()))
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
