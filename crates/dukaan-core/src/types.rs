//! # Domain Types
//!
//! Core domain types used throughout Dukaan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Expense      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  stock          │   │  product_id(FK) │   │  expense_type   │       │
//! │  │  price_paise    │   │  qty            │   │  amount_paise   │       │
//! │  │  is_deleted     │   │  amount_paise   │   │  items (JSON)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌───────────────────┐   ┌───────────────────┐   ┌──────────────┐      │
//! │  │ SalePaymentMethod │   │ ExpenseType       │   │ DayRevenue   │      │
//! │  │  Cash | QrCode    │   │  Salary | ...     │   │ per-date     │      │
//! │  └───────────────────┘   └───────────────────┘   └──────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Invariant
//! `Product.stock >= 0` as observed by any reader. Every mutation path that
//! touches stock goes through the store's clamped `adjust_stock` primitive;
//! a transient negative delta clamps to zero, never persists negative.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Methods
// =============================================================================

/// How a sale was paid for.
///
/// Anything that is not `QrCode` (including missing/legacy records) is
/// treated as cash by the reporting layer.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalePaymentMethod {
    /// Physical cash payment.
    Cash,
    /// QR code / bank transfer payment.
    QrCode,
}

/// How an expense was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpensePaymentMethod {
    /// Paid from the cash drawer.
    Cash,
    /// Paid from the bank account (QR settlements land here too).
    Bank,
}

impl Default for ExpensePaymentMethod {
    fn default() -> Self {
        ExpensePaymentMethod::Cash
    }
}

// =============================================================================
// Expense Type
// =============================================================================

/// The category of an expense record.
///
/// ## Reporting Buckets
/// ```text
/// salary, operational_cost, shop_rent, other → "expenses" bucket
/// stock_purchase                             → "stockPurchase" bucket
/// advertisement                              → excluded from both
///                                              (reported via allocation)
/// ```
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    Salary,
    OperationalCost,
    StockPurchase,
    Advertisement,
    ShopRent,
    Other,
}

impl ExpenseType {
    /// True for the operating-cost types that sum into the daily
    /// "expenses" bucket (everything except stock purchases and
    /// advertisement).
    pub const fn is_operating_cost(&self) -> bool {
        matches!(
            self,
            ExpenseType::Salary
                | ExpenseType::OperationalCost
                | ExpenseType::Other
                | ExpenseType::ShopRent
        )
    }

    /// True for the types drawn from the 70% expense+stock allocation
    /// bucket (operating costs plus stock purchases).
    pub const fn draws_from_expense_stock_bucket(&self) -> bool {
        self.is_operating_cost() || matches!(self, ExpenseType::StockPurchase)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the shop's inventory.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4), assigned by the store on create.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Size/Pattern/Product Type (legacy combined field).
    pub variant: Option<String>,

    /// Size.
    pub size: Option<String>,

    /// Pattern.
    pub pattern: Option<String>,

    /// Product type label (Regular, Gift, etc.).
    pub product_type: Option<String>,

    /// Design.
    pub design: Option<String>,

    /// Category.
    pub category: String,

    /// Selling price in paise.
    pub price_paise: i64,

    /// Cost price in paise (for margin calculations).
    pub cost_price_paise: i64,

    /// Current stock level. Never negative once persisted.
    pub stock: i64,

    /// Always keep stock available.
    pub stock_always_needed: Option<bool>,

    /// Average stock needed in the shop (reorder threshold).
    pub avg_stock_needed: Option<i64>,

    /// Freeform notes.
    pub notes: Option<String>,

    /// Photo URL.
    pub photo_url: Option<String>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,

    /// Soft-delete flag: products referenced by sales history are marked
    /// deleted rather than removed.
    pub is_deleted: bool,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_paise(self.cost_price_paise)
    }

    /// Reorder status derived from the current stock level.
    ///
    /// Computed on read instead of stored, so there is no second
    /// invariant to keep in sync with `stock`.
    #[inline]
    pub fn reorder_status(&self) -> ReorderStatus {
        ReorderStatus::derive(self.stock, self.avg_stock_needed)
    }
}

// =============================================================================
// Reorder Status
// =============================================================================

/// Derived restocking urgency for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderStatus {
    /// Stock is above the reorder threshold (or no threshold is set).
    Ok,
    /// Stock is at or below the reorder threshold.
    Low,
    /// Stock is exhausted.
    Urgent,
}

impl ReorderStatus {
    /// Pure derivation from (stock, threshold).
    ///
    /// Without a threshold the only signal is an empty shelf.
    pub fn derive(stock: i64, avg_stock_needed: Option<i64>) -> ReorderStatus {
        if stock <= 0 {
            return ReorderStatus::Urgent;
        }
        match avg_stock_needed {
            Some(threshold) if threshold > 0 && stock <= threshold => ReorderStatus::Low,
            _ => ReorderStatus::Ok,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale of a single product.
///
/// `amount_paise` is the cash value entered at the till, NOT
/// `qty × price` — discounts and haggling make the two diverge.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    /// Units sold. Stored as provided; the engine does not reject
    /// zero/negative quantities (see the engine docs for the quirk).
    pub qty: i64,
    /// Cash value of the sale in paise.
    pub amount_paise: i64,
    /// Missing on legacy rows; readers treat absent as cash.
    pub payment_method: Option<SalePaymentMethod>,
    pub sold_at: DateTime<Utc>,
    pub note: Option<String>,
    /// Who recorded the sale.
    pub sold_by: Option<String>,
}

impl Sale {
    /// Returns the sale amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }

    /// Calendar date the sale happened on (truncation of `sold_at`).
    #[inline]
    pub fn sold_on(&self) -> NaiveDate {
        self.sold_at.date_naive()
    }

    /// True when the sale was settled over the QR/bank rail.
    #[inline]
    pub fn is_qr(&self) -> bool {
        self.payment_method == Some(SalePaymentMethod::QrCode)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// One line of a stock purchase: which product and how many units landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub product_id: String,
    pub qty: i64,
}

/// A cash-flow record: salaries, rent, stock purchases, advertising, etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub amount_paise: i64,
    pub payment_method: ExpensePaymentMethod,
    pub description: Option<String>,
    /// Calendar date, no time component.
    pub date: NaiveDate,
    /// Populated only when `expense_type == StockPurchase`: the products
    /// whose stock this purchase increased at creation time.
    pub items: Option<Vec<ExpenseItem>>,
}

impl Expense {
    /// Returns the expense amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

// =============================================================================
// Creation Inputs
// =============================================================================

/// Fields for creating a product. The store assigns `id` and `updated_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price_paise: i64,
    pub cost_price_paise: i64,
    pub stock: i64,
    pub variant: Option<String>,
    pub size: Option<String>,
    pub pattern: Option<String>,
    pub product_type: Option<String>,
    pub design: Option<String>,
    pub stock_always_needed: Option<bool>,
    pub avg_stock_needed: Option<i64>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

/// Fields for recording a sale. The store assigns `id`; `sold_at`
/// defaults to now when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub product_id: String,
    pub qty: i64,
    pub amount_paise: i64,
    pub payment_method: Option<SalePaymentMethod>,
    pub sold_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub sold_by: Option<String>,
}

/// Fields for recording an expense. The store assigns `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub amount_paise: i64,
    #[serde(default)]
    pub payment_method: ExpensePaymentMethod,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub items: Option<Vec<ExpenseItem>>,
}

// =============================================================================
// Patches
// =============================================================================

/// Partial product update: `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_paise: Option<i64>,
    pub cost_price_paise: Option<i64>,
    pub stock: Option<i64>,
    pub variant: Option<String>,
    pub size: Option<String>,
    pub pattern: Option<String>,
    pub product_type: Option<String>,
    pub design: Option<String>,
    pub stock_always_needed: Option<bool>,
    pub avg_stock_needed: Option<i64>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl ProductPatch {
    /// Merges this patch onto a product in place. `updated_at` is the
    /// caller's responsibility (the store refreshes it on write).
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(price) = self.price_paise {
            product.price_paise = price;
        }
        if let Some(cost) = self.cost_price_paise {
            product.cost_price_paise = cost;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(variant) = &self.variant {
            product.variant = Some(variant.clone());
        }
        if let Some(size) = &self.size {
            product.size = Some(size.clone());
        }
        if let Some(pattern) = &self.pattern {
            product.pattern = Some(pattern.clone());
        }
        if let Some(product_type) = &self.product_type {
            product.product_type = Some(product_type.clone());
        }
        if let Some(design) = &self.design {
            product.design = Some(design.clone());
        }
        if let Some(always) = self.stock_always_needed {
            product.stock_always_needed = Some(always);
        }
        if let Some(avg) = self.avg_stock_needed {
            product.avg_stock_needed = Some(avg);
        }
        if let Some(notes) = &self.notes {
            product.notes = Some(notes.clone());
        }
        if let Some(photo_url) = &self.photo_url {
            product.photo_url = Some(photo_url.clone());
        }
    }
}

/// Partial sale update. Only `qty` and `amount` are editable; a qty
/// change carries a stock adjustment, an amount-only change does not.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SalePatch {
    pub qty: Option<i64>,
    pub amount_paise: Option<i64>,
}

impl SalePatch {
    /// True when the patch carries no change at all.
    pub const fn is_empty(&self) -> bool {
        self.qty.is_none() && self.amount_paise.is_none()
    }
}

/// Partial expense update. Editing an expense never touches stock, even
/// for stock purchases (a documented asymmetry with sales).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensePatch {
    #[serde(rename = "type")]
    pub expense_type: Option<ExpenseType>,
    pub amount_paise: Option<i64>,
    pub payment_method: Option<ExpensePaymentMethod>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpensePatch {
    /// True when the patch carries no change at all.
    pub const fn is_empty(&self) -> bool {
        self.expense_type.is_none()
            && self.amount_paise.is_none()
            && self.payment_method.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

// =============================================================================
// Reporting Types
// =============================================================================

/// An inclusive calendar-date window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Inclusive containment on both ends.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One day's revenue buckets, all amounts in paise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRevenue {
    pub date: NaiveDate,
    /// Sales settled in cash (including legacy rows with no method).
    pub cash_sales: i64,
    /// Sales settled over QR/bank.
    pub qr_sales: i64,
    /// Operating expenses (salary, operational cost, shop rent, other).
    pub expenses: i64,
    /// Stock purchase outlay.
    pub stock_purchase: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expense_type_buckets() {
        assert!(ExpenseType::Salary.is_operating_cost());
        assert!(ExpenseType::OperationalCost.is_operating_cost());
        assert!(ExpenseType::ShopRent.is_operating_cost());
        assert!(ExpenseType::Other.is_operating_cost());
        assert!(!ExpenseType::StockPurchase.is_operating_cost());
        assert!(!ExpenseType::Advertisement.is_operating_cost());

        assert!(ExpenseType::StockPurchase.draws_from_expense_stock_bucket());
        assert!(ExpenseType::Salary.draws_from_expense_stock_bucket());
        assert!(!ExpenseType::Advertisement.draws_from_expense_stock_bucket());
    }

    #[test]
    fn test_payment_method_wire_format() {
        let qr = serde_json::to_string(&SalePaymentMethod::QrCode).unwrap();
        assert_eq!(qr, "\"qr_code\"");
        let cash = serde_json::to_string(&SalePaymentMethod::Cash).unwrap();
        assert_eq!(cash, "\"cash\"");
    }

    #[test]
    fn test_expense_type_wire_format() {
        let t = serde_json::to_string(&ExpenseType::StockPurchase).unwrap();
        assert_eq!(t, "\"stock_purchase\"");
        let t = serde_json::to_string(&ExpenseType::ShopRent).unwrap();
        assert_eq!(t, "\"shop_rent\"");
    }

    #[test]
    fn test_reorder_status_derivation() {
        assert_eq!(ReorderStatus::derive(0, Some(10)), ReorderStatus::Urgent);
        assert_eq!(ReorderStatus::derive(0, None), ReorderStatus::Urgent);
        assert_eq!(ReorderStatus::derive(5, Some(10)), ReorderStatus::Low);
        assert_eq!(ReorderStatus::derive(10, Some(10)), ReorderStatus::Low);
        assert_eq!(ReorderStatus::derive(11, Some(10)), ReorderStatus::Ok);
        assert_eq!(ReorderStatus::derive(3, None), ReorderStatus::Ok);
    }

    #[test]
    fn test_sale_sold_on_truncates_time() {
        let sale = Sale {
            id: "s1".into(),
            product_id: "p1".into(),
            qty: 1,
            amount_paise: 100,
            payment_method: None,
            sold_at: Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap(),
            note: None,
            sold_by: None,
        };
        assert_eq!(sale.sold_on(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(!sale.is_qr());
    }

    #[test]
    fn test_sale_patch_is_empty() {
        assert!(SalePatch::default().is_empty());
        assert!(!SalePatch { qty: Some(2), amount_paise: None }.is_empty());
    }

    #[test]
    fn test_product_patch_apply_merges_only_present_fields() {
        let mut product = Product {
            id: "p1".into(),
            name: "Karahi".into(),
            variant: None,
            size: Some("12in".into()),
            pattern: None,
            product_type: Some("Regular".into()),
            design: None,
            category: "Cookware".into(),
            price_paise: 50_000,
            cost_price_paise: 30_000,
            stock: 4,
            stock_always_needed: None,
            avg_stock_needed: Some(6),
            notes: None,
            photo_url: None,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_deleted: false,
        };

        let patch = ProductPatch {
            price_paise: Some(55_000),
            notes: Some("new supplier".into()),
            ..ProductPatch::default()
        };
        patch.apply(&mut product);

        assert_eq!(product.price_paise, 55_000);
        assert_eq!(product.notes.as_deref(), Some("new supplier"));
        // Untouched fields survive
        assert_eq!(product.name, "Karahi");
        assert_eq!(product.size.as_deref(), Some("12in"));
        assert_eq!(product.stock, 4);
    }
}
