//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // First numeric run, optionally with a fractional part
    pub static ref NUMBER: Regex = Regex::new(
        r"([0-9]+(?:\.[0-9]+)?)"
    ).unwrap();

    // Currency symbol followed by a grouped/decimal amount: ₹1,234.50 or $ 10.00
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"([₹$€]\s?\d{1,3}[,\d]*(?:\.\d{2})?)"
    ).unwrap();

    // Day-month-year with slash, dash or space: 12/01/2024, 3-4-24
    pub static ref DATE_DMY: Regex = Regex::new(
        r"(\b\d{1,2}[/\-\s]\d{1,2}[/\-\s]\d{2,4}\b)"
    ).unwrap();

    // First brace-delimited span, spanning lines
    pub static ref JSON_OBJECT: Regex = Regex::new(
        r"(?s)\{.*\}"
    ).unwrap();
}
