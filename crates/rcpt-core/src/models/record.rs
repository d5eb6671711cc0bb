//! Model output after parsing and the final normalized record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model output split into its two parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedModelOutput {
    /// One-line human readable summary.
    pub summary_line: String,

    /// JSON object emitted after the separator; empty when it could not be
    /// recovered.
    pub fields: Map<String, Value>,
}

/// Final record: the model's fields with `amount` and `currency` reconciled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord {
    fields: Map<String, Value>,
}

impl NormalizedRecord {
    pub(crate) fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Normalized amount, if one could be parsed.
    pub fn amount(&self) -> Option<f64> {
        self.fields.get("amount").and_then(Value::as_f64)
    }

    /// Currency code, empty when unknown.
    pub fn currency(&self) -> &str {
        self.fields
            .get("currency")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Look up any other field the model produced.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}
