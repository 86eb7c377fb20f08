//! # In-Memory Backend
//!
//! A whole-store `Mutex` over three vectors. Every operation takes the one
//! lock, so writes serialize and readers always observe a consistent
//! snapshot, which is exactly the consistency story the SQLite backend
//! gives via its single writer.
//!
//! Differences from the SQLite backend, by design:
//! - deletes are hard deletes (nothing references rows across restarts)
//! - data does not survive the process
//!
//! Useful for tests and for running the engine without a database file.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use dukaan_core::{Expense, ExpensePatch, Product, ProductPatch, Sale, SalePatch};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    products: Vec<Product>,
    sales: Vec<Sale>,
    expenses: Vec<Expense>,
}

/// Volatile store with the same operation surface as the SQLite backend.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self, include_deleted: bool) -> StoreResult<Vec<Product>> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| include_deleted || !p.is_deleted)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(products)
    }

    pub async fn get_product(&self, id: &str) -> StoreResult<Product> {
        let state = self.state.lock().await;
        state
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    pub async fn get_active_product(&self, id: &str) -> StoreResult<Product> {
        let state = self.state.lock().await;
        state
            .products
            .iter()
            .find(|p| p.id == id && !p.is_deleted)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    pub async fn insert_product(&self, product: Product) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::UniqueViolation {
                field: "products.id".to_string(),
                value: product.id,
            });
        }
        debug!(id = %product.id, "Inserting product (memory)");
        state.products.push(product);
        Ok(())
    }

    pub async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Product> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        patch.apply(product);
        product.updated_at = now;
        Ok(product.clone())
    }

    /// Clamped stock delta, mirroring the SQLite `MAX(0, stock + delta)`.
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<Product> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.stock = (product.stock + delta).max(0);
        product.updated_at = now;
        Ok(product.clone())
    }

    /// Hard delete. The memory backend keeps no history across runs, so
    /// there is nothing for a soft-delete flag to protect.
    pub async fn delete_product(&self, id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(StoreError::not_found("Product", id));
        }
        Ok(())
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        let state = self.state.lock().await;
        let mut sales = state.sales.clone();
        sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));
        Ok(sales)
    }

    pub async fn get_sale(&self, id: &str) -> StoreResult<Sale> {
        let state = self.state.lock().await;
        state
            .sales
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Sale", id))
    }

    pub async fn insert_sale(&self, sale: Sale) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        debug!(id = %sale.id, "Inserting sale (memory)");
        state.sales.push(sale);
        Ok(())
    }

    pub async fn update_sale(&self, id: &str, patch: &SalePatch) -> StoreResult<Sale> {
        let mut state = self.state.lock().await;
        let sale = state
            .sales
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("Sale", id))?;
        if let Some(qty) = patch.qty {
            sale.qty = qty;
        }
        if let Some(amount) = patch.amount_paise {
            sale.amount_paise = amount;
        }
        Ok(sale.clone())
    }

    pub async fn delete_sale(&self, id: &str) -> StoreResult<Sale> {
        let mut state = self.state.lock().await;
        let pos = state
            .sales
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("Sale", id))?;
        Ok(state.sales.remove(pos))
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    pub async fn list_expenses(&self) -> StoreResult<Vec<Expense>> {
        let state = self.state.lock().await;
        let mut expenses = state.expenses.clone();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(expenses)
    }

    pub async fn get_expense(&self, id: &str) -> StoreResult<Expense> {
        let state = self.state.lock().await;
        state
            .expenses
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Expense", id))
    }

    pub async fn insert_expense(&self, expense: Expense) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        debug!(id = %expense.id, "Inserting expense (memory)");
        state.expenses.push(expense);
        Ok(())
    }

    pub async fn update_expense(&self, id: &str, patch: &ExpensePatch) -> StoreResult<Expense> {
        let mut state = self.state.lock().await;
        let expense = state
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::not_found("Expense", id))?;
        if let Some(expense_type) = patch.expense_type {
            expense.expense_type = expense_type;
        }
        if let Some(amount) = patch.amount_paise {
            expense.amount_paise = amount;
        }
        if let Some(method) = patch.payment_method {
            expense.payment_method = method;
        }
        if let Some(description) = &patch.description {
            expense.description = Some(description.clone());
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        Ok(expense.clone())
    }

    pub async fn delete_expense(&self, id: &str) -> StoreResult<Expense> {
        let mut state = self.state.lock().await;
        let pos = state
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::not_found("Expense", id))?;
        Ok(state.expenses.remove(pos))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            variant: None,
            size: None,
            pattern: None,
            product_type: None,
            design: None,
            category: "General".to_string(),
            price_paise: 10_000,
            cost_price_paise: 6_000,
            stock,
            stock_always_needed: None,
            avg_stock_needed: None,
            notes: None,
            photo_url: None,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_adjust_stock_clamps_at_zero() {
        let ledger = MemoryLedger::new();
        ledger.insert_product(product("p1", 2)).await.unwrap();

        let now = Utc::now();
        let updated = ledger.adjust_stock("p1", -5, now).await.unwrap();
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.updated_at, now);
    }

    #[tokio::test]
    async fn test_adjust_stock_missing_product() {
        let ledger = MemoryLedger::new();
        let err = ledger.adjust_stock("ghost", 1, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_product_is_hard() {
        let ledger = MemoryLedger::new();
        ledger.insert_product(product("p1", 2)).await.unwrap();
        ledger.delete_product("p1").await.unwrap();

        assert!(ledger.get_product("p1").await.is_err());
        assert!(ledger.list_products(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_product_id_rejected() {
        let ledger = MemoryLedger::new();
        ledger.insert_product(product("p1", 2)).await.unwrap();
        let err = ledger.insert_product(product("p1", 9)).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_products_ordered_by_updated_at_desc() {
        let ledger = MemoryLedger::new();
        let mut old = product("old", 1);
        old.updated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut new = product("new", 1);
        new.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        ledger.insert_product(old).await.unwrap();
        ledger.insert_product(new).await.unwrap();

        let listed = ledger.list_products(false).await.unwrap();
        assert_eq!(listed[0].id, "new");
        assert_eq!(listed[1].id, "old");
    }
}
