//! Amount parsing for receipt totals.

use super::patterns::{CURRENCY_AMOUNT, NUMBER};
use super::FieldExtractor;

/// Currency symbols stripped before parsing.
const STRIPPED_SYMBOLS: [char; 3] = ['₹', '$', '€'];

/// Parse the first number out of a currency-formatted string.
///
/// Thousands separators and the rupee, dollar and euro symbols are removed
/// first. Anything that does not yield a finite number is `None`.
pub fn parse_amount(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && !STRIPPED_SYMBOLS.contains(c))
        .collect();

    let caps = NUMBER.captures(cleaned.trim())?;
    caps[1].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Finds the first symbol-prefixed amount anywhere in a text blob.
pub struct CurrencyAmountExtractor;

impl CurrencyAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurrencyAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CurrencyAmountExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        CURRENCY_AMOUNT
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        CURRENCY_AMOUNT
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}
