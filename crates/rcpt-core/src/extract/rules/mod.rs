//! Rule-based field recovery for receipts.

pub mod amounts;
pub mod currency;
pub mod dates;
pub mod patterns;

pub use amounts::{parse_amount, CurrencyAmountExtractor};
pub use currency::detect_currency;
pub use dates::DateExtractor;

/// Trait for text-scanning field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
