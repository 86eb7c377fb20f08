//! # SQLite Connection Pool Management
//!
//! ## Pool Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Connection Pool Design                              │
//! │                                                                         │
//! │   Engine Tasks                    Pool                     SQLite       │
//! │  ┌───────────┐              ┌────────────┐             ┌───────────┐   │
//! │  │  task 1   │─────────────▶│  conn 1    │────────────▶│           │   │
//! │  ├───────────┤              ├────────────┤             │  dukaan   │   │
//! │  │  task 2   │─────────────▶│  conn 2    │────────────▶│   .db     │   │
//! │  ├───────────┤              ├────────────┤             │           │   │
//! │  │  task N   │──── wait ───▶│  conn ...  │────────────▶│  (WAL)    │   │
//! │  └───────────┘              └────────────┘             └───────────┘   │
//! │                                                                         │
//! │  WAL mode: readers never block the writer, writer never blocks readers │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::migrations::run_migrations;
use crate::repository::{ExpenseRepository, ProductRepository, SaleRepository};

// =============================================================================
// Database Configuration
// =============================================================================

/// Configuration for the SQLite backend.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout
    pub connect_timeout: Duration,

    /// Idle connection timeout before closing
    pub idle_timeout: Duration,

    /// Whether to run migrations on startup
    pub run_migrations: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("dukaan.db"),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }
}

impl DbConfig {
    /// Creates a config pointing at the given database file.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Creates a config for an in-memory database (testing).
    ///
    /// In-memory SQLite lives and dies with its connection, so the pool
    /// is pinned to a single connection.
    pub fn in_memory() -> Self {
        Self {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        }
    }

    /// Sets the maximum connection count.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Disables automatic migrations (for testing or manual control).
    pub fn without_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }
}

// =============================================================================
// Database Handle
// =============================================================================

/// Owns the connection pool and hands out repositories.
///
/// Cloning is cheap (the pool is internally reference-counted), so a
/// `Database` can be shared freely across tasks.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database, applying WAL mode and pending migrations.
    pub async fn connect(config: &DbConfig) -> StoreResult<Self> {
        let path_str = config.database_path.to_string_lossy();

        info!(path = %path_str, "Opening SQLite database");

        let url = if path_str == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}", path_str)
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        if config.run_migrations {
            run_migrations(&pool).await?;
        }

        info!("Database ready");

        Ok(Self { pool })
    }

    /// Opens an in-memory database with migrations applied (testing).
    pub async fn connect_in_memory() -> StoreResult<Self> {
        Self::connect(&DbConfig::in_memory()).await
    }

    /// Returns the raw pool for repositories and ad-hoc queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Product repository bound to this pool.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Sale repository bound to this pool.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Expense repository bound to this pool.
    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.pool.clone())
    }

    /// Cheap liveness probe.
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.min_connections, 1);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_in_memory_pins_single_connection() {
        let config = DbConfig::in_memory();
        assert_eq!(config.database_path, PathBuf::from(":memory:"));
        assert_eq!(config.max_connections, 1);
    }

    #[tokio::test]
    async fn test_connect_and_health_check() {
        let db = Database::connect_in_memory().await.unwrap();
        db.health_check().await.unwrap();
        db.close().await;
    }
}
