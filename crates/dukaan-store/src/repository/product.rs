//! # Product Repository
//!
//! Row-level access to the `products` table. The one non-obvious piece is
//! [`ProductRepository::adjust_stock`]: a single clamped UPDATE so that
//! concurrent adjustments can never race a read-modify-write into a
//! negative stock level.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use dukaan_core::Product;

use crate::error::{StoreError, StoreResult};

/// Repository for product data access.
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists products, newest update first. Soft-deleted rows are
    /// excluded unless `include_deleted` is set.
    pub async fn list(&self, include_deleted: bool) -> StoreResult<Vec<Product>> {
        debug!(include_deleted, "Listing products");

        let sql = if include_deleted {
            "SELECT * FROM products ORDER BY updated_at DESC"
        } else {
            "SELECT * FROM products WHERE is_deleted = 0 ORDER BY updated_at DESC"
        };

        let products = sqlx::query_as::<_, Product>(sql).fetch_all(&self.pool).await?;
        Ok(products)
    }

    /// Fetches a product by id, soft-deleted rows included (sales history
    /// still references them).
    pub async fn get(&self, id: &str) -> StoreResult<Product> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        Ok(product)
    }

    /// Fetches a product by id, rejecting soft-deleted rows.
    pub async fn get_active(&self, id: &str) -> StoreResult<Product> {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ? AND is_deleted = 0")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", id))?;

        Ok(product)
    }

    /// Inserts a fully-formed product row.
    pub async fn insert(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, variant, size, pattern, product_type, design,
                category, price_paise, cost_price_paise, stock,
                stock_always_needed, avg_stock_needed, notes, photo_url,
                updated_at, is_deleted
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.variant)
        .bind(&product.size)
        .bind(&product.pattern)
        .bind(&product.product_type)
        .bind(&product.design)
        .bind(&product.category)
        .bind(product.price_paise)
        .bind(product.cost_price_paise)
        .bind(product.stock)
        .bind(product.stock_always_needed)
        .bind(product.avg_stock_needed)
        .bind(&product.notes)
        .bind(&product.photo_url)
        .bind(product.updated_at)
        .bind(product.is_deleted)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes every mutable column of an existing product row.
    pub async fn update(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, variant = ?, size = ?, pattern = ?,
                product_type = ?, design = ?, category = ?,
                price_paise = ?, cost_price_paise = ?, stock = ?,
                stock_always_needed = ?, avg_stock_needed = ?,
                notes = ?, photo_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.variant)
        .bind(&product.size)
        .bind(&product.pattern)
        .bind(&product.product_type)
        .bind(&product.design)
        .bind(&product.category)
        .bind(product.price_paise)
        .bind(product.cost_price_paise)
        .bind(product.stock)
        .bind(product.stock_always_needed)
        .bind(product.avg_stock_needed)
        .bind(&product.notes)
        .bind(&product.photo_url)
        .bind(product.updated_at)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Applies a clamped stock delta in one statement and returns the
    /// product as stored afterwards.
    ///
    /// `MAX(0, stock + delta)` makes over-decrements land on zero instead
    /// of going negative, matching the stock invariant.
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<Product> {
        debug!(id, delta, "Adjusting product stock");

        let result = sqlx::query(
            "UPDATE products SET stock = MAX(0, stock + ?), updated_at = ? WHERE id = ?",
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        self.get(id).await
    }

    /// Soft-deletes a product. The row stays so historical sales keep a
    /// valid reference.
    pub async fn soft_delete(&self, id: &str, now: DateTime<Utc>) -> StoreResult<()> {
        debug!(id, "Soft-deleting product");

        let result =
            sqlx::query("UPDATE products SET is_deleted = 1, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }
}
