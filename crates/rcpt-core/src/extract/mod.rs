//! Receipt field extraction module.

mod expense;
pub mod rules;

pub use expense::ExpenseFieldExtractor;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
