//! # dukaan-store: Persistence and the Mutation Engine
//!
//! Everything stateful in Dukaan lives here: the SQLite and in-memory
//! backends, the unified [`Ledger`] facade over them, and the
//! [`LedgerService`] engine that keeps sales, expenses and stock counts
//! consistent.
//!
//! ## Layer Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        dukaan-store                                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  engine::LedgerService — validation + stock choreography        │   │
//! │  │  + reporting entry points (daily revenue, allocation, rails)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │  ledger::Ledger — one surface, two backends                     │   │
//! │  └───────────┬─────────────────────────────────────┬───────────────┘   │
//! │              │                                     │                    │
//! │  ┌───────────▼───────────────┐       ┌─────────────▼───────────────┐   │
//! │  │ pool + repository + mig.  │       │ memory::MemoryLedger        │   │
//! │  │ (sqlx / SQLite, WAL)      │       │ (Mutex over vectors)        │   │
//! │  └───────────────────────────┘       └─────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business math stays pure in `dukaan-core`; this crate only adds I/O
//! and ordering around it.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use engine::{LedgerService, RecordedExpense};
pub use error::{LedgerError, LedgerResult, StoreError, StoreResult};
pub use ledger::{BackendConfig, Ledger};
pub use memory::MemoryLedger;
pub use pool::{Database, DbConfig};
