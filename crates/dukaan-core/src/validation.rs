//! # Validation Module
//!
//! Input validation for mutation requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request layer (out of scope)                                 │
//! │  └── Shape checks, immediate user feedback                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE, called by the engine before any write           │
//! │  └── Required fields, numeric sanity                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (NOT NULL, CHECK constraints)                       │
//! │                                                                         │
//! │  Invalid input is rejected before the first write: no partial state.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Deliberately NOT validated
//! Sale quantity: zero and negative quantities are accepted and stored as
//! provided. The stock decrement simply clamps at zero. This mirrors the
//! till's historical behavior and is pinned by engine tests rather than
//! "fixed" here.

use crate::error::{ValidationError, ValidationResult};
use crate::types::{ExpensePatch, NewExpense, NewProduct, NewSale, SalePatch};

/// Maximum length accepted for names, categories and descriptions.
pub const MAX_TEXT_LEN: usize = 200;

/// Validates an entity id reference (non-empty after trimming).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.len() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

/// Validates a price/cost amount in paise (zero allowed).
pub fn validate_price_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a stock level (never negative on direct writes).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates fields for a new product.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_text("name", &input.name)?;
    validate_text("category", &input.category)?;
    validate_price_paise("price", input.price_paise)?;
    validate_price_paise("cost_price", input.cost_price_paise)?;
    validate_stock(input.stock)?;
    Ok(())
}

/// Validates fields for a new sale.
///
/// Note the absence of a qty check — see the module docs.
pub fn validate_new_sale(input: &NewSale) -> ValidationResult<()> {
    validate_id("product_id", &input.product_id)?;
    validate_price_paise("amount", input.amount_paise)?;
    Ok(())
}

/// Validates a sale patch: at least one editable field must be present.
pub fn validate_sale_patch(patch: &SalePatch) -> ValidationResult<()> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch {
            expected: "qty, amount".to_string(),
        });
    }
    if let Some(amount) = patch.amount_paise {
        validate_price_paise("amount", amount)?;
    }
    Ok(())
}

/// Validates fields for a new expense: positive amount, sane date already
/// guaranteed by the `NaiveDate` type.
pub fn validate_new_expense(input: &NewExpense) -> ValidationResult<()> {
    if input.amount_paise <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    if let Some(description) = &input.description {
        if description.len() > MAX_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_TEXT_LEN,
            });
        }
    }
    Ok(())
}

/// Validates an expense patch.
pub fn validate_expense_patch(patch: &ExpensePatch) -> ValidationResult<()> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch {
            expected: "type, amount, payment_method, description, date".to_string(),
        });
    }
    if let Some(amount) = patch.amount_paise {
        if amount <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpensePaymentMethod, ExpenseType};
    use chrono::NaiveDate;

    fn sale(product_id: &str, qty: i64, amount: i64) -> NewSale {
        NewSale {
            product_id: product_id.to_string(),
            qty,
            amount_paise: amount,
            payment_method: None,
            sold_at: None,
            note: None,
            sold_by: None,
        }
    }

    #[test]
    fn test_new_sale_requires_product_id() {
        assert!(validate_new_sale(&sale("p1", 1, 1000)).is_ok());
        assert!(validate_new_sale(&sale("", 1, 1000)).is_err());
        assert!(validate_new_sale(&sale("   ", 1, 1000)).is_err());
    }

    #[test]
    fn test_new_sale_accepts_zero_and_negative_qty() {
        // Historical quirk, deliberately not rejected
        assert!(validate_new_sale(&sale("p1", 0, 1000)).is_ok());
        assert!(validate_new_sale(&sale("p1", -3, 1000)).is_ok());
    }

    #[test]
    fn test_new_sale_rejects_negative_amount() {
        assert!(validate_new_sale(&sale("p1", 1, -1)).is_err());
    }

    #[test]
    fn test_sale_patch_must_not_be_empty() {
        assert!(validate_sale_patch(&SalePatch::default()).is_err());
        assert!(validate_sale_patch(&SalePatch { qty: Some(2), amount_paise: None }).is_ok());
        assert!(validate_sale_patch(&SalePatch { qty: None, amount_paise: Some(-5) }).is_err());
    }

    #[test]
    fn test_new_expense_requires_positive_amount() {
        let mut expense = NewExpense {
            expense_type: ExpenseType::Salary,
            amount_paise: 50_000,
            payment_method: ExpensePaymentMethod::Cash,
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            items: None,
        };
        assert!(validate_new_expense(&expense).is_ok());

        expense.amount_paise = 0;
        assert!(validate_new_expense(&expense).is_err());

        expense.amount_paise = -100;
        assert!(validate_new_expense(&expense).is_err());
    }

    #[test]
    fn test_new_product_checks() {
        let mut product = NewProduct {
            name: "Tawa".to_string(),
            category: "Cookware".to_string(),
            price_paise: 45_000,
            cost_price_paise: 30_000,
            stock: 10,
            ..NewProduct::default()
        };
        assert!(validate_new_product(&product).is_ok());

        product.name = "".to_string();
        assert!(validate_new_product(&product).is_err());

        product.name = "Tawa".to_string();
        product.stock = -1;
        assert!(validate_new_product(&product).is_err());
    }
}
