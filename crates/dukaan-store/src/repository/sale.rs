//! # Sale Repository
//!
//! Row-level access to the `sales` table. Stock choreography around
//! inserts/edits/deletes is the engine's job; this layer only moves rows.

use sqlx::SqlitePool;
use tracing::debug;

use dukaan_core::{Sale, SalePatch};

use crate::error::{StoreError, StoreResult};

/// Repository for sale data access.
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists all sales, newest first.
    pub async fn list(&self) -> StoreResult<Vec<Sale>> {
        debug!("Listing sales");

        let sales = sqlx::query_as::<_, Sale>("SELECT * FROM sales ORDER BY sold_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Fetches a sale by id.
    pub async fn get(&self, id: &str) -> StoreResult<Sale> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Sale", id))?;

        Ok(sale)
    }

    /// Inserts a fully-formed sale row.
    pub async fn insert(&self, sale: &Sale) -> StoreResult<()> {
        debug!(id = %sale.id, product_id = %sale.product_id, qty = sale.qty, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, product_id, qty, amount_paise, payment_method,
                               sold_at, note, sold_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(sale.qty)
        .bind(sale.amount_paise)
        .bind(sale.payment_method)
        .bind(sale.sold_at)
        .bind(&sale.note)
        .bind(&sale.sold_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a qty/amount patch and returns the sale as stored.
    /// COALESCE keeps absent patch fields untouched.
    pub async fn update(&self, id: &str, patch: &SalePatch) -> StoreResult<Sale> {
        debug!(id, ?patch, "Updating sale");

        let result = sqlx::query(
            r#"
            UPDATE sales
            SET qty = COALESCE(?, qty),
                amount_paise = COALESCE(?, amount_paise)
            WHERE id = ?
            "#,
        )
        .bind(patch.qty)
        .bind(patch.amount_paise)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Sale", id));
        }

        self.get(id).await
    }

    /// Deletes a sale and returns the removed row (the engine needs its
    /// qty to restore stock).
    pub async fn delete(&self, id: &str) -> StoreResult<Sale> {
        debug!(id, "Deleting sale");

        let sale = self.get(id).await?;

        sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(sale)
    }
}
