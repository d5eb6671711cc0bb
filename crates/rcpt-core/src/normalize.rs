//! Reconciliation of model-asserted amount and currency with the OCR summary.

use serde_json::{Number, Value};

use crate::extract::rules::{detect_currency, parse_amount};
use crate::models::expense::ExpenseSummary;
use crate::models::record::{NormalizedRecord, ParsedModelOutput};

/// Fills `amount` and `currency` on the model's fields.
///
/// The model's own value is used when it is truthy; otherwise the raw total
/// from the OCR summary is parsed. An explicit `null` amount therefore still
/// falls back to the raw total.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizationStage;

impl NormalizationStage {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, parsed: &ParsedModelOutput, summary: &ExpenseSummary) -> NormalizedRecord {
        let mut fields = parsed.fields.clone();
        let total = summary.total.as_deref();

        let amount = match fields.get("amount").filter(|v| is_truthy(v)) {
            Some(value) => parse_amount(Some(value_text(value).as_str())),
            None => parse_amount(total),
        };
        let amount = amount
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number);

        // Currency is a short code or empty, so a non-string model value is replaced too.
        let currency = match fields.get("currency") {
            Some(Value::String(code)) if !code.is_empty() => code.clone(),
            _ => detect_currency(total).to_string(),
        };

        fields.insert("amount".to_string(), amount);
        fields.insert("currency".to_string(), Value::String(currency));

        NormalizedRecord::from_fields(fields)
    }
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are
/// falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
