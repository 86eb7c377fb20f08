//! # Stock Consistency Engine
//!
//! Every mutation that touches both the ledger and stock goes through
//! here, in a fixed choreography:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Mutation Choreography                               │
//! │                                                                         │
//! │  record_sale      validate → resolve product → insert sale              │
//! │                   → stock -= qty (clamped)                              │
//! │  update_sale      validate → load sale → stock += (oldQty - newQty)     │
//! │                   → persist patch                                       │
//! │  delete_sale      delete sale → stock += qty (restore)                  │
//! │  record_expense   validate → insert expense                             │
//! │                   → stock += qty per line item (stock purchases only)   │
//! │  update_expense   patch only — stock untouched, even for purchases      │
//! │  delete_expense   delete only — stock untouched, even for purchases     │
//! │                                                                         │
//! │  A failure after the primary write surfaces as StockOutOfSync and is   │
//! │  logged at ERROR; it is never silently swallowed.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The expense-side asymmetry (stock moves at creation only) mirrors how
//! the shop actually operates: goods land on the shelf when the purchase
//! is recorded, and a later bookkeeping correction to the purchase row
//! does not un-land them.

use tracing::{error, info, warn};

use dukaan_core::allocation::{carry_forward, window_allocation, CarryForward, WindowAllocation};
use dukaan_core::report::{cash_flow_summary, daily_revenue, CashFlowSummary};
use dukaan_core::validation::{
    validate_expense_patch, validate_new_expense, validate_new_product, validate_new_sale,
    validate_sale_patch,
};
use dukaan_core::{
    DateRange, DayRevenue, Expense, ExpensePatch, ExpenseType, NewExpense, NewProduct, NewSale,
    Product, ProductPatch, Sale, SalePatch,
};

use crate::error::{LedgerError, LedgerResult, StoreError};
use crate::ledger::{BackendConfig, Ledger};

// =============================================================================
// Results
// =============================================================================

/// Outcome of [`LedgerService::record_expense`].
///
/// A stock purchase whose line items reference missing products is still a
/// valid expense; the unusable lines are reported here instead of failing
/// the whole operation.
#[derive(Debug, Clone)]
pub struct RecordedExpense {
    pub expense: Expense,
    /// Product ids from line items that could not be applied (product not
    /// found). Empty for non-purchase expenses and clean purchases.
    pub skipped_product_ids: Vec<String>,
}

// =============================================================================
// Ledger Service
// =============================================================================

/// The engine: owns a [`Ledger`] and enforces the mutation choreography.
pub struct LedgerService {
    ledger: Ledger,
}

impl LedgerService {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Opens the backend named by the environment and wraps it.
    pub async fn from_env() -> LedgerResult<Self> {
        let ledger = Ledger::open(BackendConfig::from_env()).await?;
        Ok(Self::new(ledger))
    }

    /// Direct access to the underlying store for callers that need raw
    /// reads (health checks, exports).
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self) -> LedgerResult<Vec<Product>> {
        Ok(self.ledger.list_products(false).await?)
    }

    pub async fn get_product(&self, id: &str) -> LedgerResult<Product> {
        Ok(self.ledger.get_product(id).await?)
    }

    pub async fn create_product(&self, new: NewProduct) -> LedgerResult<Product> {
        validate_new_product(&new)?;
        let product = self.ledger.create_product(new).await?;
        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: &str, patch: &ProductPatch) -> LedgerResult<Product> {
        if let Some(price) = patch.price_paise {
            dukaan_core::validation::validate_price_paise("price", price)?;
        }
        if let Some(cost) = patch.cost_price_paise {
            dukaan_core::validation::validate_price_paise("cost_price", cost)?;
        }
        if let Some(stock) = patch.stock {
            dukaan_core::validation::validate_stock(stock)?;
        }
        Ok(self.ledger.update_product(id, patch).await?)
    }

    pub async fn delete_product(&self, id: &str) -> LedgerResult<()> {
        self.ledger.delete_product(id).await?;
        info!(id, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn list_sales(&self) -> LedgerResult<Vec<Sale>> {
        Ok(self.ledger.list_sales().await?)
    }

    pub async fn get_sale(&self, id: &str) -> LedgerResult<Sale> {
        Ok(self.ledger.get_sale(id).await?)
    }

    /// Records a sale and decrements the product's stock.
    ///
    /// The product is resolved first: an unknown or deleted product aborts
    /// before anything is written, so a rejected sale leaves no trace.
    pub async fn record_sale(&self, new: NewSale) -> LedgerResult<Sale> {
        validate_new_sale(&new)?;

        let product = self.ledger.get_active_product(&new.product_id).await?;
        let qty = new.qty;
        let sale = self.ledger.create_sale(new).await?;

        if let Err(e) = self.ledger.adjust_stock(&product.id, -qty).await {
            error!(
                sale_id = %sale.id,
                product_id = %product.id,
                error = %e,
                "Sale persisted but stock decrement failed"
            );
            return Err(LedgerError::StockOutOfSync {
                entity: "Sale",
                id: sale.id,
                source: e,
            });
        }

        info!(id = %sale.id, product_id = %product.id, qty, "Sale recorded");
        Ok(sale)
    }

    /// Edits a sale's quantity and/or amount.
    ///
    /// A qty change re-levels stock by `oldQty - newQty` before the patch
    /// is persisted; an amount-only edit touches no stock at all. If the
    /// product has since been removed, the adjustment is skipped with a
    /// warning (there is no shelf left to re-level).
    pub async fn update_sale(&self, id: &str, patch: &SalePatch) -> LedgerResult<Sale> {
        validate_sale_patch(patch)?;

        let existing = self.ledger.get_sale(id).await?;

        let mut adjusted = false;
        if let Some(new_qty) = patch.qty {
            let delta = existing.qty - new_qty;
            if delta != 0 {
                match self.ledger.adjust_stock(&existing.product_id, delta).await {
                    Ok(_) => adjusted = true,
                    Err(StoreError::NotFound { .. }) => {
                        warn!(
                            sale_id = %id,
                            product_id = %existing.product_id,
                            "Sale edit references a missing product, skipping stock re-level"
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        match self.ledger.update_sale(id, patch).await {
            Ok(sale) => {
                info!(id, "Sale updated");
                Ok(sale)
            }
            Err(e) if adjusted => {
                error!(sale_id = %id, error = %e, "Stock re-leveled but sale patch failed");
                Err(LedgerError::StockOutOfSync {
                    entity: "Sale",
                    id: id.to_string(),
                    source: e,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a sale and returns its quantity to the shelf.
    pub async fn delete_sale(&self, id: &str) -> LedgerResult<Sale> {
        let sale = self.ledger.delete_sale(id).await?;

        match self.ledger.adjust_stock(&sale.product_id, sale.qty).await {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                warn!(
                    sale_id = %sale.id,
                    product_id = %sale.product_id,
                    "Deleted sale references a missing product, skipping stock restore"
                );
            }
            Err(e) => {
                error!(
                    sale_id = %sale.id,
                    product_id = %sale.product_id,
                    error = %e,
                    "Sale deleted but stock restore failed"
                );
                return Err(LedgerError::StockOutOfSync {
                    entity: "Sale",
                    id: sale.id,
                    source: e,
                });
            }
        }

        info!(id = %sale.id, "Sale deleted, stock restored");
        Ok(sale)
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    pub async fn list_expenses(&self) -> LedgerResult<Vec<Expense>> {
        Ok(self.ledger.list_expenses().await?)
    }

    pub async fn get_expense(&self, id: &str) -> LedgerResult<Expense> {
        Ok(self.ledger.get_expense(id).await?)
    }

    /// Records an expense; stock-purchase line items increment their
    /// products' stock.
    ///
    /// Line items with a non-positive qty are ignored. Items whose product
    /// no longer exists are skipped and reported in the result; the rest
    /// of the purchase still applies.
    pub async fn record_expense(&self, new: NewExpense) -> LedgerResult<RecordedExpense> {
        validate_new_expense(&new)?;

        let expense = self.ledger.create_expense(new).await?;

        let mut skipped = Vec::new();
        if expense.expense_type == ExpenseType::StockPurchase {
            if let Some(items) = &expense.items {
                for item in items {
                    if item.qty <= 0 {
                        continue;
                    }
                    match self.ledger.adjust_stock(&item.product_id, item.qty).await {
                        Ok(_) => {}
                        Err(StoreError::NotFound { .. }) => {
                            warn!(
                                expense_id = %expense.id,
                                product_id = %item.product_id,
                                "Stock purchase line references a missing product, skipped"
                            );
                            skipped.push(item.product_id.clone());
                        }
                        Err(e) => {
                            error!(
                                expense_id = %expense.id,
                                product_id = %item.product_id,
                                error = %e,
                                "Expense persisted but stock increment failed"
                            );
                            return Err(LedgerError::StockOutOfSync {
                                entity: "Expense",
                                id: expense.id,
                                source: e,
                            });
                        }
                    }
                }
            }
        }

        info!(id = %expense.id, expense_type = ?expense.expense_type, "Expense recorded");
        Ok(RecordedExpense {
            expense,
            skipped_product_ids: skipped,
        })
    }

    /// Edits an expense. Stock is never touched here, even when the
    /// expense is a stock purchase.
    pub async fn update_expense(&self, id: &str, patch: &ExpensePatch) -> LedgerResult<Expense> {
        validate_expense_patch(patch)?;
        let expense = self.ledger.update_expense(id, patch).await?;
        info!(id, "Expense updated");
        Ok(expense)
    }

    /// Deletes an expense. Stock purchased through it stays on the shelf.
    pub async fn delete_expense(&self, id: &str) -> LedgerResult<Expense> {
        let expense = self.ledger.delete_expense(id).await?;
        info!(id = %expense.id, "Expense deleted");
        Ok(expense)
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Per-day revenue buckets over an inclusive date window.
    pub async fn daily_revenue(&self, range: DateRange) -> LedgerResult<Vec<DayRevenue>> {
        let sales = self.ledger.list_sales().await?;
        let expenses = self.ledger.list_expenses().await?;
        Ok(daily_revenue(&sales, &expenses, range))
    }

    /// Allocation-vs-spend over one reporting window.
    pub async fn window_allocation(&self, range: DateRange) -> LedgerResult<WindowAllocation> {
        let sales = self.ledger.list_sales().await?;
        let expenses = self.ledger.list_expenses().await?;
        Ok(window_allocation(&sales, &expenses, range))
    }

    /// Cumulative envelope balances over all history up to `end`.
    pub async fn carry_forward(&self, end: chrono::NaiveDate) -> LedgerResult<CarryForward> {
        let sales = self.ledger.list_sales().await?;
        let expenses = self.ledger.list_expenses().await?;
        Ok(carry_forward(&sales, &expenses, end))
    }

    /// All-time payment-rail totals and remaining balances.
    pub async fn cash_flow(&self) -> LedgerResult<CashFlowSummary> {
        let sales = self.ledger.list_sales().await?;
        let expenses = self.ledger.list_expenses().await?;
        Ok(cash_flow_summary(&sales, &expenses))
    }
}

// =============================================================================
// Engine Tests
// =============================================================================
