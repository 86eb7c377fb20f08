//! # Revenue Aggregator
//!
//! Pure reporting functions over the full sales + expenses collections.
//!
//! ## Bucketing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    daily_revenue bucketing                              │
//! │                                                                         │
//! │  Sale ── sold_at truncated to date ──┐                                 │
//! │    payment qr_code   → qrSales       │                                 │
//! │    anything else     → cashSales     │   one DayRevenue per date       │
//! │                                      ├─► that has at least one sale    │
//! │  Expense ── its own date field ──────┘   or expense in [start, end]    │
//! │    salary/operational/rent/other → expenses                            │
//! │    stock_purchase                → stockPurchase                       │
//! │    advertisement                 → neither bucket (the date row still  │
//! │                                    appears; ads report via allocation) │
//! │                                                                         │
//! │  Output ordered ascending by date.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records strictly outside the window contribute to nothing — not even a
//! zero row. All functions here are deterministic and side-effect free:
//! same sales+expenses in, same buckets out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DateRange, DayRevenue, Expense, ExpensePaymentMethod, ExpenseType, Sale};

#[derive(Debug, Clone, Copy, Default)]
struct DayBuckets {
    cash: i64,
    qr: i64,
    expenses: i64,
    stock_purchase: i64,
}

/// Groups sales and expenses into per-day revenue buckets over an
/// inclusive date window.
///
/// A BTreeMap keys the grouping, so the ascending date order the callers
/// rely on falls out of iteration rather than a separate sort.
pub fn daily_revenue(sales: &[Sale], expenses: &[Expense], range: DateRange) -> Vec<DayRevenue> {
    let mut grouped: BTreeMap<chrono::NaiveDate, DayBuckets> = BTreeMap::new();

    for sale in sales {
        let day = sale.sold_on();
        if !range.contains(day) {
            continue;
        }
        let entry = grouped.entry(day).or_default();
        if sale.is_qr() {
            entry.qr += sale.amount_paise;
        } else {
            entry.cash += sale.amount_paise;
        }
    }

    for expense in expenses {
        if !range.contains(expense.date) {
            continue;
        }
        let entry = grouped.entry(expense.date).or_default();
        match expense.expense_type {
            ExpenseType::StockPurchase => entry.stock_purchase += expense.amount_paise,
            ExpenseType::Advertisement => {} // date row exists, buckets untouched
            _ => entry.expenses += expense.amount_paise,
        }
    }

    grouped
        .into_iter()
        .map(|(date, buckets)| DayRevenue {
            date,
            cash_sales: buckets.cash,
            qr_sales: buckets.qr,
            expenses: buckets.expenses,
            stock_purchase: buckets.stock_purchase,
        })
        .collect()
}

/// All-time totals and remaining balance per payment rail.
///
/// QR sales settle to the bank, so they pair with bank-paid expenses;
/// cash sales pair with cash-paid expenses. Advertisement spending is
/// tracked by the allocation calculator and excluded here, matching the
/// daily buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    /// Sales settled in cash (legacy rows with no payment method included).
    pub total_cash_paise: i64,
    /// Sales settled over QR/bank.
    pub total_bank_paise: i64,
    /// Operating expenses across both rails.
    pub total_expense_paise: i64,
    /// Stock purchases across both rails.
    pub total_stock_paise: i64,
    /// Cash sales minus cash-paid operating expenses and stock purchases.
    pub remaining_cash_paise: i64,
    /// Bank sales minus bank-paid operating expenses and stock purchases.
    pub remaining_bank_paise: i64,
}

/// Computes the payment-rail summary over the full history.
pub fn cash_flow_summary(sales: &[Sale], expenses: &[Expense]) -> CashFlowSummary {
    let mut total_cash = 0i64;
    let mut total_bank = 0i64;
    for sale in sales {
        if sale.is_qr() {
            total_bank += sale.amount_paise;
        } else {
            total_cash += sale.amount_paise;
        }
    }

    let mut expense_cash = 0i64;
    let mut expense_bank = 0i64;
    let mut stock_cash = 0i64;
    let mut stock_bank = 0i64;
    for expense in expenses {
        let rail_cash = expense.payment_method == ExpensePaymentMethod::Cash;
        if expense.expense_type.is_operating_cost() {
            if rail_cash {
                expense_cash += expense.amount_paise;
            } else {
                expense_bank += expense.amount_paise;
            }
        } else if expense.expense_type == ExpenseType::StockPurchase {
            if rail_cash {
                stock_cash += expense.amount_paise;
            } else {
                stock_bank += expense.amount_paise;
            }
        }
    }

    CashFlowSummary {
        total_cash_paise: total_cash,
        total_bank_paise: total_bank,
        total_expense_paise: expense_cash + expense_bank,
        total_stock_paise: stock_cash + stock_bank,
        remaining_cash_paise: total_cash - expense_cash - stock_cash,
        remaining_bank_paise: total_bank - expense_bank - stock_bank,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpenseItem, SalePaymentMethod};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(day: (i32, u32, u32), method: Option<SalePaymentMethod>, amount: i64) -> Sale {
        Sale {
            id: format!("s-{}", amount),
            product_id: "p1".to_string(),
            qty: 1,
            amount_paise: amount,
            payment_method: method,
            sold_at: Utc.with_ymd_and_hms(day.0, day.1, day.2, 12, 0, 0).unwrap(),
            note: None,
            sold_by: None,
        }
    }

    fn expense(day: (i32, u32, u32), expense_type: ExpenseType, amount: i64) -> Expense {
        expense_on_rail(day, expense_type, amount, ExpensePaymentMethod::Cash)
    }

    fn expense_on_rail(
        day: (i32, u32, u32),
        expense_type: ExpenseType,
        amount: i64,
        rail: ExpensePaymentMethod,
    ) -> Expense {
        Expense {
            id: format!("e-{}", amount),
            expense_type,
            amount_paise: amount,
            payment_method: rail,
            description: None,
            date: date(day.0, day.1, day.2),
            items: if expense_type == ExpenseType::StockPurchase {
                Some(vec![ExpenseItem { product_id: "p1".to_string(), qty: 1 }])
            } else {
                None
            },
        }
    }

    #[test]
    fn test_daily_revenue_groups_and_splits_by_method() {
        // Two cash/qr sales on day one, one cash sale on day two
        let sales = vec![
            sale((2024, 1, 1), Some(SalePaymentMethod::Cash), 10_000),
            sale((2024, 1, 1), Some(SalePaymentMethod::QrCode), 5_000),
            sale((2024, 1, 2), Some(SalePaymentMethod::Cash), 2_000),
        ];
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 2));

        let revenue = daily_revenue(&sales, &[], range);

        assert_eq!(
            revenue,
            vec![
                DayRevenue {
                    date: date(2024, 1, 1),
                    cash_sales: 10_000,
                    qr_sales: 5_000,
                    expenses: 0,
                    stock_purchase: 0,
                },
                DayRevenue {
                    date: date(2024, 1, 2),
                    cash_sales: 2_000,
                    qr_sales: 0,
                    expenses: 0,
                    stock_purchase: 0,
                },
            ]
        );
    }

    #[test]
    fn test_daily_revenue_is_idempotent() {
        let sales = vec![
            sale((2024, 2, 10), None, 7_500),
            sale((2024, 2, 12), Some(SalePaymentMethod::QrCode), 1_200),
        ];
        let expenses = vec![expense((2024, 2, 11), ExpenseType::Salary, 3_000)];
        let range = DateRange::new(date(2024, 2, 1), date(2024, 2, 29));

        let first = daily_revenue(&sales, &expenses, range);
        let second = daily_revenue(&sales, &expenses, range);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_payment_method_routes_to_cash() {
        let sales = vec![sale((2024, 3, 1), None, 4_000)];
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 1));

        let revenue = daily_revenue(&sales, &[], range);
        assert_eq!(revenue[0].cash_sales, 4_000);
        assert_eq!(revenue[0].qr_sales, 0);
    }

    #[test]
    fn test_out_of_window_records_contribute_nothing() {
        let sales = vec![
            sale((2024, 1, 1), Some(SalePaymentMethod::Cash), 9_999),
            sale((2024, 1, 15), Some(SalePaymentMethod::Cash), 1_000),
        ];
        let expenses = vec![expense((2024, 1, 31), ExpenseType::ShopRent, 2_000)];
        let range = DateRange::new(date(2024, 1, 10), date(2024, 1, 20));

        let revenue = daily_revenue(&sales, &expenses, range);
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].date, date(2024, 1, 15));
        assert_eq!(revenue[0].cash_sales, 1_000);
    }

    #[test]
    fn test_expense_buckets_split_by_type() {
        let expenses = vec![
            expense((2024, 4, 5), ExpenseType::Salary, 10_000),
            expense((2024, 4, 5), ExpenseType::ShopRent, 20_000),
            expense((2024, 4, 5), ExpenseType::StockPurchase, 30_000),
        ];
        let range = DateRange::new(date(2024, 4, 1), date(2024, 4, 30));

        let revenue = daily_revenue(&[], &expenses, range);
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].expenses, 30_000);
        assert_eq!(revenue[0].stock_purchase, 30_000);
    }

    #[test]
    fn test_advertisement_creates_date_row_but_no_bucket() {
        let expenses = vec![expense((2024, 5, 7), ExpenseType::Advertisement, 8_000)];
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 31));

        let revenue = daily_revenue(&[], &expenses, range);
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].date, date(2024, 5, 7));
        assert_eq!(revenue[0].expenses, 0);
        assert_eq!(revenue[0].stock_purchase, 0);
    }

    #[test]
    fn test_bucket_sums_match_sale_amounts() {
        let sales = vec![
            sale((2024, 6, 1), Some(SalePaymentMethod::Cash), 100),
            sale((2024, 6, 2), Some(SalePaymentMethod::QrCode), 200),
            sale((2024, 6, 2), None, 300),
            sale((2024, 6, 3), Some(SalePaymentMethod::QrCode), 400),
        ];
        let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30));

        let revenue = daily_revenue(&sales, &[], range);
        let cash: i64 = revenue.iter().map(|d| d.cash_sales).sum();
        let qr: i64 = revenue.iter().map(|d| d.qr_sales).sum();
        assert_eq!(cash, 400);
        assert_eq!(qr, 600);
        assert_eq!(cash + qr, sales.iter().map(|s| s.amount_paise).sum::<i64>());
    }

    #[test]
    fn test_cash_flow_summary_rails() {
        let sales = vec![
            sale((2024, 7, 1), Some(SalePaymentMethod::Cash), 50_000),
            sale((2024, 7, 2), Some(SalePaymentMethod::QrCode), 30_000),
        ];
        let expenses = vec![
            expense_on_rail((2024, 7, 1), ExpenseType::Salary, 10_000, ExpensePaymentMethod::Cash),
            expense_on_rail((2024, 7, 1), ExpenseType::ShopRent, 5_000, ExpensePaymentMethod::Bank),
            expense_on_rail(
                (2024, 7, 2),
                ExpenseType::StockPurchase,
                20_000,
                ExpensePaymentMethod::Cash,
            ),
            // Advertisement is tracked via allocation, not the rails
            expense_on_rail(
                (2024, 7, 3),
                ExpenseType::Advertisement,
                7_000,
                ExpensePaymentMethod::Cash,
            ),
        ];

        let summary = cash_flow_summary(&sales, &expenses);
        assert_eq!(summary.total_cash_paise, 50_000);
        assert_eq!(summary.total_bank_paise, 30_000);
        assert_eq!(summary.total_expense_paise, 15_000);
        assert_eq!(summary.total_stock_paise, 20_000);
        assert_eq!(summary.remaining_cash_paise, 50_000 - 10_000 - 20_000);
        assert_eq!(summary.remaining_bank_paise, 30_000 - 5_000);
    }
}
