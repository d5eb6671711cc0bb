//! Expense-analysis response and the summary derived from it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ExtractionError;

/// Raw response of the expense-analysis service.
///
/// The response is kept as the JSON value the service returned so it can be
/// persisted and scanned without losing fields the typed view does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawExpenseResponse(Value);

impl RawExpenseResponse {
    /// Wrap an already decoded JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Decode a response from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes).map(Self)
    }

    /// Serialize the whole response into one compact JSON string.
    pub fn to_text(&self) -> String {
        self.0.to_string()
    }

    /// Typed view of the first expense document, if any.
    ///
    /// Only the first document is ever considered. A missing, null or empty
    /// document list yields `Ok(None)`; a list of the wrong shape is an error.
    pub fn first_document(&self) -> Result<Option<ExpenseDocument>, ExtractionError> {
        let root = self
            .0
            .as_object()
            .ok_or_else(|| ExtractionError::Shape("response is not an object".to_string()))?;

        let docs = match root.get("ExpenseDocuments") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(docs)) => docs,
            Some(other) => {
                return Err(ExtractionError::Shape(format!(
                    "ExpenseDocuments is not a list: {}",
                    type_name(other)
                )))
            }
        };

        match docs.first() {
            None => Ok(None),
            Some(doc) => ExpenseDocument::deserialize(doc)
                .map(Some)
                .map_err(|e| ExtractionError::Shape(e.to_string())),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One analyzed document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExpenseDocument {
    /// Document-level typed fields (vendor, total, date, ...).
    pub summary_fields: Vec<ExpenseField>,
    /// Groups of line items.
    pub line_item_groups: Vec<LineItemGroup>,
}

/// A typed key/value pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExpenseField {
    /// Normalized field type, e.g. `TOTAL` or `VENDOR_NAME`.
    #[serde(rename = "Type")]
    pub field_type: Option<Detection>,
    /// Detected value text.
    pub value_detection: Option<Detection>,
    /// Detected label text printed next to the value.
    pub label_detection: Option<Detection>,
}

impl ExpenseField {
    /// Trimmed type text, empty when absent.
    pub fn type_text(&self) -> &str {
        Detection::text_of(&self.field_type)
    }

    /// Trimmed value text, empty when absent.
    pub fn value_text(&self) -> &str {
        Detection::text_of(&self.value_detection)
    }

    /// Trimmed label text, empty when absent.
    pub fn label_text(&self) -> &str {
        Detection::text_of(&self.label_detection)
    }
}

/// Text detected by the service with its confidence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Detection {
    pub text: Option<String>,
    pub confidence: Option<f64>,
}

impl Detection {
    fn text_of(detection: &Option<Detection>) -> &str {
        detection
            .as_ref()
            .and_then(|d| d.text.as_deref())
            .map(str::trim)
            .unwrap_or("")
    }
}

/// A group of line items (usually one table on the receipt).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LineItemGroup {
    pub line_items: Vec<LineItem>,
}

/// One receipt line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LineItem {
    pub line_item_expense_fields: Vec<ExpenseField>,
}

/// Best-effort summary of a receipt.
///
/// Total and date are kept exactly as printed; parsing happens later during
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExpenseSummary {
    /// Merchant name.
    pub vendor: Option<String>,

    /// Total as printed, e.g. `$10.00`.
    pub total: Option<String>,

    /// Date as printed.
    pub date: Option<String>,

    /// One string per line item.
    #[serde(deserialize_with = "null_as_empty")]
    pub items: Vec<String>,

    /// Name of the file the summary was extracted from.
    #[serde(deserialize_with = "null_as_empty")]
    pub source: String,
}

impl ExpenseSummary {
    /// Summary with every field unset, tagged with its source.
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_first_document_missing_list() {
        let response = RawExpenseResponse::new(json!({"DocumentMetadata": {"Pages": 1}}));
        assert!(response.first_document().unwrap().is_none());

        let response = RawExpenseResponse::new(json!({"ExpenseDocuments": []}));
        assert!(response.first_document().unwrap().is_none());
    }

    #[test]
    fn test_first_document_wrong_shape() {
        let response = RawExpenseResponse::new(json!(["not", "an", "object"]));
        assert!(response.first_document().is_err());

        let response = RawExpenseResponse::new(json!({"ExpenseDocuments": {"a": 1}}));
        assert!(response.first_document().is_err());

        let response = RawExpenseResponse::new(json!({
            "ExpenseDocuments": [{"SummaryFields": "oops"}]
        }));
        assert!(response.first_document().is_err());
    }

    #[test]
    fn test_field_texts_are_trimmed() {
        let response = RawExpenseResponse::new(json!({
            "ExpenseDocuments": [{
                "SummaryFields": [{
                    "Type": {"Text": " TOTAL ", "Confidence": 99.1},
                    "ValueDetection": {"Text": " $5.00\n"},
                    "LabelDetection": null
                }]
            }]
        }));

        let doc = response.first_document().unwrap().unwrap();
        let field = &doc.summary_fields[0];
        assert_eq!(field.type_text(), "TOTAL");
        assert_eq!(field.value_text(), "$5.00");
        assert_eq!(field.label_text(), "");
    }

    #[test]
    fn test_summary_json_keys() {
        let summary = ExpenseSummary {
            vendor: Some("Acme".to_string()),
            total: None,
            date: Some("01/02/2024".to_string()),
            items: vec!["Coffee".to_string()],
            source: "foo.jpg".to_string(),
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({
                "Vendor": "Acme",
                "Total": null,
                "Date": "01/02/2024",
                "Items": ["Coffee"],
                "Source": "foo.jpg"
            })
        );
    }

    #[test]
    fn test_summary_tolerates_missing_and_null_keys() {
        let summary: ExpenseSummary =
            serde_json::from_value(json!({"Vendor": "Acme", "Items": null})).unwrap();
        assert_eq!(summary.vendor.as_deref(), Some("Acme"));
        assert!(summary.items.is_empty());
        assert_eq!(summary.source, "");
    }
}
