//! # Ledger: Unified Store Facade
//!
//! ## Backend Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Backend Dispatch                                   │
//! │                                                                         │
//! │   BackendConfig::from_env()          Ledger                             │
//! │  ┌──────────────────────┐      ┌──────────────────┐                     │
//! │  │ DUKAAN_DB=memory     │─────▶│ Ledger::Memory   │──▶ MemoryLedger     │
//! │  │ DUKAAN_DB=<path>     │─────▶│ Ledger::Sqlite   │──▶ Database (sqlx)  │
//! │  │ (unset → dukaan.db)  │      └──────────────────┘                     │
//! │  └──────────────────────┘                                               │
//! │                                                                         │
//! │  The backend is chosen once at startup and never switched at runtime.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Ledger` owns identity: `create_*` operations assign UUIDs and
//! timestamps so both backends store identical records for identical
//! inputs. Business rules (stock choreography, validation) live one layer
//! up in the engine.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use dukaan_core::{
    Expense, ExpensePatch, NewExpense, NewProduct, NewSale, Product, ProductPatch, Sale, SalePatch,
};

use crate::error::StoreResult;
use crate::memory::MemoryLedger;
use crate::pool::{Database, DbConfig};

// =============================================================================
// Backend Configuration
// =============================================================================

/// Which persistence backend to run on.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Durable SQLite store.
    Sqlite(DbConfig),
    /// Volatile in-memory store.
    Memory,
}

impl BackendConfig {
    /// Reads the backend choice from the `DUKAAN_DB` environment variable:
    /// `"memory"` selects the volatile store, any other value is a SQLite
    /// file path, unset falls back to `dukaan.db`.
    pub fn from_env() -> Self {
        match std::env::var("DUKAAN_DB") {
            Ok(value) if value == "memory" => BackendConfig::Memory,
            Ok(path) => BackendConfig::Sqlite(DbConfig::new(path)),
            Err(_) => BackendConfig::Sqlite(DbConfig::default()),
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// The store behind the engine: one of two backends behind one surface.
pub enum Ledger {
    Sqlite(Database),
    Memory(MemoryLedger),
}

impl Ledger {
    /// Opens the configured backend.
    pub async fn open(config: BackendConfig) -> StoreResult<Self> {
        match config {
            BackendConfig::Sqlite(db_config) => {
                info!("Opening SQLite ledger backend");
                Ok(Ledger::Sqlite(Database::connect(&db_config).await?))
            }
            BackendConfig::Memory => {
                info!("Opening in-memory ledger backend");
                Ok(Ledger::Memory(MemoryLedger::new()))
            }
        }
    }

    /// Shortcut for tests: a migrated in-memory SQLite backend.
    pub async fn open_sqlite_in_memory() -> StoreResult<Self> {
        Ok(Ledger::Sqlite(Database::connect_in_memory().await?))
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self, include_deleted: bool) -> StoreResult<Vec<Product>> {
        match self {
            Ledger::Sqlite(db) => db.products().list(include_deleted).await,
            Ledger::Memory(mem) => mem.list_products(include_deleted).await,
        }
    }

    pub async fn get_product(&self, id: &str) -> StoreResult<Product> {
        match self {
            Ledger::Sqlite(db) => db.products().get(id).await,
            Ledger::Memory(mem) => mem.get_product(id).await,
        }
    }

    /// Fetch rejecting soft-deleted products (used before recording sales).
    pub async fn get_active_product(&self, id: &str) -> StoreResult<Product> {
        match self {
            Ledger::Sqlite(db) => db.products().get_active(id).await,
            Ledger::Memory(mem) => mem.get_active_product(id).await,
        }
    }

    /// Materializes and stores a product, assigning id and timestamp.
    pub async fn create_product(&self, new: NewProduct) -> StoreResult<Product> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            variant: new.variant,
            size: new.size,
            pattern: new.pattern,
            product_type: new.product_type,
            design: new.design,
            category: new.category,
            price_paise: new.price_paise,
            cost_price_paise: new.cost_price_paise,
            stock: new.stock,
            stock_always_needed: new.stock_always_needed,
            avg_stock_needed: new.avg_stock_needed,
            notes: new.notes,
            photo_url: new.photo_url,
            updated_at: Utc::now(),
            is_deleted: false,
        };

        match self {
            Ledger::Sqlite(db) => db.products().insert(&product).await?,
            Ledger::Memory(mem) => mem.insert_product(product.clone()).await?,
        }

        Ok(product)
    }

    /// Merges a patch onto a product and refreshes its timestamp.
    pub async fn update_product(&self, id: &str, patch: &ProductPatch) -> StoreResult<Product> {
        let now = Utc::now();
        match self {
            Ledger::Sqlite(db) => {
                let repo = db.products();
                let mut product = repo.get(id).await?;
                patch.apply(&mut product);
                product.updated_at = now;
                repo.update(&product).await?;
                Ok(product)
            }
            Ledger::Memory(mem) => mem.update_product(id, patch, now).await,
        }
    }

    /// Clamped stock delta (`stock := max(0, stock + delta)`).
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<Product> {
        let now = Utc::now();
        match self {
            Ledger::Sqlite(db) => db.products().adjust_stock(id, delta, now).await,
            Ledger::Memory(mem) => mem.adjust_stock(id, delta, now).await,
        }
    }

    /// Removes a product from listings. SQLite soft-deletes so history
    /// keeps its reference; the memory backend hard-deletes.
    pub async fn delete_product(&self, id: &str) -> StoreResult<()> {
        match self {
            Ledger::Sqlite(db) => db.products().soft_delete(id, Utc::now()).await,
            Ledger::Memory(mem) => mem.delete_product(id).await,
        }
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        match self {
            Ledger::Sqlite(db) => db.sales().list().await,
            Ledger::Memory(mem) => mem.list_sales().await,
        }
    }

    pub async fn get_sale(&self, id: &str) -> StoreResult<Sale> {
        match self {
            Ledger::Sqlite(db) => db.sales().get(id).await,
            Ledger::Memory(mem) => mem.get_sale(id).await,
        }
    }

    /// Materializes and stores a sale, assigning id; `sold_at` defaults
    /// to now when absent.
    pub async fn create_sale(&self, new: NewSale) -> StoreResult<Sale> {
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            qty: new.qty,
            amount_paise: new.amount_paise,
            payment_method: new.payment_method,
            sold_at: new.sold_at.unwrap_or_else(Utc::now),
            note: new.note,
            sold_by: new.sold_by,
        };

        match self {
            Ledger::Sqlite(db) => db.sales().insert(&sale).await?,
            Ledger::Memory(mem) => mem.insert_sale(sale.clone()).await?,
        }

        Ok(sale)
    }

    pub async fn update_sale(&self, id: &str, patch: &SalePatch) -> StoreResult<Sale> {
        match self {
            Ledger::Sqlite(db) => db.sales().update(id, patch).await,
            Ledger::Memory(mem) => mem.update_sale(id, patch).await,
        }
    }

    /// Deletes a sale, returning the removed row.
    pub async fn delete_sale(&self, id: &str) -> StoreResult<Sale> {
        match self {
            Ledger::Sqlite(db) => db.sales().delete(id).await,
            Ledger::Memory(mem) => mem.delete_sale(id).await,
        }
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    pub async fn list_expenses(&self) -> StoreResult<Vec<Expense>> {
        match self {
            Ledger::Sqlite(db) => db.expenses().list().await,
            Ledger::Memory(mem) => mem.list_expenses().await,
        }
    }

    pub async fn get_expense(&self, id: &str) -> StoreResult<Expense> {
        match self {
            Ledger::Sqlite(db) => db.expenses().get(id).await,
            Ledger::Memory(mem) => mem.get_expense(id).await,
        }
    }

    /// Materializes and stores an expense, assigning id.
    pub async fn create_expense(&self, new: NewExpense) -> StoreResult<Expense> {
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            expense_type: new.expense_type,
            amount_paise: new.amount_paise,
            payment_method: new.payment_method,
            description: new.description,
            date: new.date,
            items: new.items,
        };

        match self {
            Ledger::Sqlite(db) => db.expenses().insert(&expense).await?,
            Ledger::Memory(mem) => mem.insert_expense(expense.clone()).await?,
        }

        Ok(expense)
    }

    pub async fn update_expense(&self, id: &str, patch: &ExpensePatch) -> StoreResult<Expense> {
        match self {
            Ledger::Sqlite(db) => db.expenses().update(id, patch).await,
            Ledger::Memory(mem) => mem.update_expense(id, patch).await,
        }
    }

    /// Deletes an expense, returning the removed row.
    pub async fn delete_expense(&self, id: &str) -> StoreResult<Expense> {
        match self {
            Ledger::Sqlite(db) => db.expenses().delete(id).await,
            Ledger::Memory(mem) => mem.delete_expense(id).await,
        }
    }

    /// Liveness probe (always healthy for the memory backend).
    pub async fn health_check(&self) -> StoreResult<()> {
        match self {
            Ledger::Sqlite(db) => db.health_check().await,
            Ledger::Memory(_) => Ok(()),
        }
    }

    /// Closes the backend, flushing SQLite connections.
    pub async fn close(&self) {
        if let Ledger::Sqlite(db) = self {
            db.close().await;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dukaan_core::{ExpensePaymentMethod, ExpenseType};

    fn new_product(name: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: "General".to_string(),
            price_paise: 10_000,
            cost_price_paise: 6_000,
            stock,
            ..NewProduct::default()
        }
    }

    #[tokio::test]
    async fn test_create_product_assigns_identity() {
        let ledger = Ledger::Memory(MemoryLedger::new());
        let product = ledger.create_product(new_product("Karahi", 5)).await.unwrap();

        assert!(!product.id.is_empty());
        assert_eq!(product.stock, 5);
        assert!(!product.is_deleted);

        let fetched = ledger.get_product(&product.id).await.unwrap();
        assert_eq!(fetched.name, "Karahi");
    }

    #[tokio::test]
    async fn test_create_sale_defaults_sold_at() {
        let ledger = Ledger::Memory(MemoryLedger::new());
        let before = Utc::now();
        let sale = ledger
            .create_sale(NewSale {
                product_id: "p1".to_string(),
                qty: 1,
                amount_paise: 9_900,
                payment_method: None,
                sold_at: None,
                note: None,
                sold_by: None,
            })
            .await
            .unwrap();

        assert!(sale.sold_at >= before);
        assert!(sale.sold_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_expense_round_trip_through_memory() {
        let ledger = Ledger::Memory(MemoryLedger::new());
        let expense = ledger
            .create_expense(NewExpense {
                expense_type: ExpenseType::ShopRent,
                amount_paise: 1_500_000,
                payment_method: ExpensePaymentMethod::Bank,
                description: Some("March rent".to_string()),
                date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                items: None,
            })
            .await
            .unwrap();

        let fetched = ledger.get_expense(&expense.id).await.unwrap();
        assert_eq!(fetched.amount_paise, 1_500_000);

        let removed = ledger.delete_expense(&expense.id).await.unwrap();
        assert_eq!(removed.id, expense.id);
        assert!(ledger.list_expenses().await.unwrap().is_empty());
    }
}
