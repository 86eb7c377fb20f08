//! # Expense Repository
//!
//! Row-level access to the `expenses` table. Stock-purchase line items are
//! stored as a JSON TEXT column and decoded here; a row whose items column
//! fails to parse is surfaced with `items = None` rather than failing the
//! whole listing (old rows predate the items format).

use sqlx::SqlitePool;
use tracing::{debug, warn};

use chrono::NaiveDate;
use dukaan_core::{Expense, ExpenseItem, ExpensePatch, ExpensePaymentMethod, ExpenseType};

use crate::error::{StoreError, StoreResult};

/// Raw row shape: `items` is JSON text until decoded.
#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    expense_type: ExpenseType,
    amount_paise: i64,
    payment_method: ExpensePaymentMethod,
    description: Option<String>,
    date: NaiveDate,
    items: Option<String>,
}

impl ExpenseRow {
    fn into_expense(self) -> Expense {
        let items = self.items.as_deref().and_then(|raw| {
            match serde_json::from_str::<Vec<ExpenseItem>>(raw) {
                Ok(items) => Some(items),
                Err(e) => {
                    warn!(id = %self.id, error = %e, "Unparseable expense items, ignoring");
                    None
                }
            }
        });

        Expense {
            id: self.id,
            expense_type: self.expense_type,
            amount_paise: self.amount_paise,
            payment_method: self.payment_method,
            description: self.description,
            date: self.date,
            items,
        }
    }
}

fn items_to_json(items: &Option<Vec<ExpenseItem>>) -> StoreResult<Option<String>> {
    items
        .as_ref()
        .map(|items| serde_json::to_string(items))
        .transpose()
        .map_err(|e| StoreError::CorruptData(e.to_string()))
}

/// Repository for expense data access.
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists all expenses, newest date first (id breaks ties so the order
    /// is stable).
    pub async fn list(&self) -> StoreResult<Vec<Expense>> {
        debug!("Listing expenses");

        let rows = sqlx::query_as::<_, ExpenseRow>(
            "SELECT * FROM expenses ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExpenseRow::into_expense).collect())
    }

    /// Fetches an expense by id.
    pub async fn get(&self, id: &str) -> StoreResult<Expense> {
        let row = sqlx::query_as::<_, ExpenseRow>("SELECT * FROM expenses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Expense", id))?;

        Ok(row.into_expense())
    }

    /// Inserts a fully-formed expense row.
    pub async fn insert(&self, expense: &Expense) -> StoreResult<()> {
        debug!(id = %expense.id, expense_type = ?expense.expense_type, "Inserting expense");

        let items = items_to_json(&expense.items)?;

        sqlx::query(
            r#"
            INSERT INTO expenses (id, expense_type, amount_paise, payment_method,
                                  description, date, items)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(expense.expense_type)
        .bind(expense.amount_paise)
        .bind(expense.payment_method)
        .bind(&expense.description)
        .bind(expense.date)
        .bind(items)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a patch and returns the expense as stored. The items column
    /// is never touched by a patch.
    pub async fn update(&self, id: &str, patch: &ExpensePatch) -> StoreResult<Expense> {
        debug!(id, "Updating expense");

        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET expense_type = COALESCE(?, expense_type),
                amount_paise = COALESCE(?, amount_paise),
                payment_method = COALESCE(?, payment_method),
                description = COALESCE(?, description),
                date = COALESCE(?, date)
            WHERE id = ?
            "#,
        )
        .bind(patch.expense_type)
        .bind(patch.amount_paise)
        .bind(patch.payment_method)
        .bind(&patch.description)
        .bind(patch.date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Expense", id));
        }

        self.get(id).await
    }

    /// Deletes an expense and returns the removed row.
    pub async fn delete(&self, id: &str) -> StoreResult<Expense> {
        debug!(id, "Deleting expense");

        let expense = self.get(id).await?;

        sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(expense)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_items_become_none() {
        let row = ExpenseRow {
            id: "e1".into(),
            expense_type: ExpenseType::StockPurchase,
            amount_paise: 5_000,
            payment_method: ExpensePaymentMethod::Cash,
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            items: Some("not json".into()),
        };
        assert!(row.into_expense().items.is_none());
    }

    #[test]
    fn test_items_round_trip_json() {
        let items = Some(vec![ExpenseItem {
            product_id: "p1".into(),
            qty: 3,
        }]);
        let json = items_to_json(&items).unwrap().unwrap();
        assert_eq!(json, r#"[{"product_id":"p1","qty":3}]"#);

        let row = ExpenseRow {
            id: "e2".into(),
            expense_type: ExpenseType::StockPurchase,
            amount_paise: 5_000,
            payment_method: ExpensePaymentMethod::Bank,
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            items: Some(json),
        };
        assert_eq!(row.into_expense().items, items);
    }
}
