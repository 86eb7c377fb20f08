//! # Repository Layer
//!
//! One repository per table, each a thin struct over the shared pool.
//! Repositories speak rows, not business rules: no validation, no stock
//! choreography, no reporting. That lives in the engine.

pub mod expense;
pub mod product;
pub mod sale;

pub use expense::ExpenseRepository;
pub use product::ProductRepository;
pub use sale::SaleRepository;
