//! Currency detection from printed symbols and markers.

/// Infer a currency code from a raw amount string.
///
/// Markers are checked in a fixed priority order, so a string carrying both a
/// rupee marker and a dollar sign resolves to INR. Unknown or empty input
/// yields an empty string.
pub fn detect_currency(s: Option<&str>) -> &'static str {
    let Some(s) = s.filter(|s| !s.is_empty()) else {
        return "";
    };

    if s.contains('₹') || s.contains("INR") || s.contains("Rs") {
        "INR"
    } else if s.contains('$') {
        "USD"
    } else if s.contains('€') {
        "EUR"
    } else {
        ""
    }
}
