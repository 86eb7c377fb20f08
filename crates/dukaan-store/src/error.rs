//! # Store and Engine Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerError (this module) ← Engine-level: validation, stock sync      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Request layer maps to a structured response                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The one error the engine must never swallow is [`LedgerError::StockOutOfSync`]:
//! the primary record was persisted but the dependent stock adjustment
//! failed, so reconciliation may be required.

use thiserror::Error;

use dukaan_core::ValidationError;

// =============================================================================
// Store Error
// =============================================================================

/// Persistence-layer errors, shared by the SQLite and memory backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate primary key).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Store connection failed (file missing, permissions, disk full).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Stored data could not be decoded (e.g. corrupt items JSON).
    #[error("Corrupt stored data: {0}")]
    CorruptData(String),

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports constraints in the message text:
                // "UNIQUE constraint failed: <table>.<column>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Ledger (Engine) Error
// =============================================================================

/// Errors surfaced by the stock consistency engine.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller input rejected before any write (no partial state).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store failed, or a referenced id does not exist. When this is
    /// raised for the primary record, no side effects have happened.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The primary record was persisted but the dependent stock
    /// adjustment failed: the ledger and stock counts are out of sync
    /// until reconciled. Never swallowed, always logged.
    #[error("{entity} {id} was persisted but the stock adjustment failed: {source}")]
    StockOutOfSync {
        entity: &'static str,
        id: String,
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    /// True when the error is a missing-id condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::Store(StoreError::NotFound { .. }))
    }
}

/// Result type for engine operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================
