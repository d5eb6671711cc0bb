//! Date recovery from unstructured text.

use super::patterns::DATE_DMY;
use super::FieldExtractor;

/// Finds day-month-year dates as printed, without parsing them.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        DATE_DMY.captures(text).map(|caps| caps[1].to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_DMY
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_date() {
        let extractor = DateExtractor::new();
        let text = r#"{"Text": "Issued 05/11/2023"}, {"Text": "Due 19-11-2023"}"#;

        assert_eq!(extractor.extract(text), Some("05/11/2023".to_string()));
        assert_eq!(extractor.extract_all(text), vec!["05/11/2023", "19-11-2023"]);
    }

    #[test]
    fn test_space_separated_date() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("Date 1 2 24"), Some("1 2 24".to_string()));
    }
}
