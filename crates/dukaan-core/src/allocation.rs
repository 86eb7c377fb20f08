//! # Allocation / Carry-Forward Calculator
//!
//! Budget-allocation vs actual-spend bucket accounting derived from
//! revenue.
//!
//! ## The Two Buckets
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every rupee of revenue feeds two envelopes:                            │
//! │                                                                         │
//! │  revenue ──► 8.1%  (810 bps) ──► advertisement envelope                 │
//! │         └──► 70%  (7000 bps) ──► expenses + stock envelope              │
//! │                                                                         │
//! │  spent(advertisement)   = Σ advertisement expenses in window            │
//! │  spent(expense+stock)   = Σ salary/operational/rent/other/stock in      │
//! │                           window                                        │
//! │  diff = allocated − spent   (can go negative: overspent envelope)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two windows exist:
//! - **Windowed**: `[start, end]` — resets per reporting period.
//! - **Carry-forward**: `[epoch, end]` — a running balance over all
//!   history, so an underspent month rolls into the next.
//!
//! The two are computed independently (their windows differ), and both are
//! pure: deterministic and idempotent over (sales, expenses, dates).
//! All arithmetic is integer paise; rounding is half away from zero (see
//! [`crate::money::allocate_paise`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::allocate_paise;
use crate::report::daily_revenue;
use crate::types::{DateRange, Expense, ExpenseType, Sale};

// =============================================================================
// Allocation Rates
// =============================================================================

/// An allocation rate in basis points (1 bps = 0.01%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRate(u32);

impl AllocationRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        AllocationRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Applies the rate to a paise amount.
    #[inline]
    pub fn apply(&self, amount_paise: i64) -> i64 {
        allocate_paise(amount_paise, self.0)
    }
}

/// Share of revenue earmarked for advertisement: 8.1%.
pub const ADVERTISEMENT_RATE: AllocationRate = AllocationRate::from_bps(810);

/// Share of revenue earmarked for operating expenses and stock
/// purchases: 70%.
pub const EXPENSE_STOCK_RATE: AllocationRate = AllocationRate::from_bps(7_000);

// =============================================================================
// Windowed Allocation
// =============================================================================

/// Allocation-vs-spend figures for one reporting window. All paise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowAllocation {
    /// Σ (cashSales + qrSales) over the window's daily revenue.
    pub total_revenue_paise: i64,
    pub allocated_advertisement_paise: i64,
    pub allocated_expense_stock_paise: i64,
    pub spent_advertisement_paise: i64,
    pub spent_expense_stock_paise: i64,
    /// allocated − spent, exactly (integer arithmetic, no drift).
    pub diff_advertisement_paise: i64,
    pub diff_expense_stock_paise: i64,
}

/// Computes allocation vs spend over `[range.start, range.end]`.
pub fn window_allocation(
    sales: &[Sale],
    expenses: &[Expense],
    range: DateRange,
) -> WindowAllocation {
    let total_revenue: i64 = daily_revenue(sales, expenses, range)
        .iter()
        .map(|day| day.cash_sales + day.qr_sales)
        .sum();

    let allocated_advertisement = ADVERTISEMENT_RATE.apply(total_revenue);
    let allocated_expense_stock = EXPENSE_STOCK_RATE.apply(total_revenue);

    let (spent_advertisement, spent_expense_stock) =
        spend_totals(expenses, |date| range.contains(date));

    WindowAllocation {
        total_revenue_paise: total_revenue,
        allocated_advertisement_paise: allocated_advertisement,
        allocated_expense_stock_paise: allocated_expense_stock,
        spent_advertisement_paise: spent_advertisement,
        spent_expense_stock_paise: spent_expense_stock,
        diff_advertisement_paise: allocated_advertisement - spent_advertisement,
        diff_expense_stock_paise: allocated_expense_stock - spent_expense_stock,
    }
}

// =============================================================================
// Carry-Forward Balances
// =============================================================================

/// Running envelope balances over all history up to `end` (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForward {
    /// Upper bound of the cumulative window.
    pub end: NaiveDate,
    /// Σ sale amounts with sold-date ≤ end.
    pub revenue_paise: i64,
    pub allocated_advertisement_paise: i64,
    pub allocated_expense_stock_paise: i64,
    pub spent_advertisement_paise: i64,
    pub spent_expense_stock_paise: i64,
    /// allocated − spent: what is still sitting in each envelope.
    pub bucket_advertisement_paise: i64,
    pub bucket_expense_stock_paise: i64,
}

/// Computes the cumulative envelope balances up to `end`.
///
/// Independent of [`window_allocation`] by construction — the cumulative
/// window starts at the beginning of history, not at a report's start
/// date.
pub fn carry_forward(sales: &[Sale], expenses: &[Expense], end: NaiveDate) -> CarryForward {
    let revenue: i64 = sales
        .iter()
        .filter(|sale| sale.sold_on() <= end)
        .map(|sale| sale.amount_paise)
        .sum();

    let allocated_advertisement = ADVERTISEMENT_RATE.apply(revenue);
    let allocated_expense_stock = EXPENSE_STOCK_RATE.apply(revenue);

    let (spent_advertisement, spent_expense_stock) =
        spend_totals(expenses, |date| date <= end);

    CarryForward {
        end,
        revenue_paise: revenue,
        allocated_advertisement_paise: allocated_advertisement,
        allocated_expense_stock_paise: allocated_expense_stock,
        spent_advertisement_paise: spent_advertisement,
        spent_expense_stock_paise: spent_expense_stock,
        bucket_advertisement_paise: allocated_advertisement - spent_advertisement,
        bucket_expense_stock_paise: allocated_expense_stock - spent_expense_stock,
    }
}

/// Sums (advertisement, expense+stock) spending for expenses whose date
/// passes the filter.
fn spend_totals<F: Fn(NaiveDate) -> bool>(expenses: &[Expense], in_window: F) -> (i64, i64) {
    let mut advertisement = 0i64;
    let mut expense_stock = 0i64;
    for expense in expenses {
        if !in_window(expense.date) {
            continue;
        }
        if expense.expense_type == ExpenseType::Advertisement {
            advertisement += expense.amount_paise;
        } else if expense.expense_type.draws_from_expense_stock_bucket() {
            expense_stock += expense.amount_paise;
        }
    }
    (advertisement, expense_stock)
}

// =============================================================================
// Unit Tests
// =============================================================================
