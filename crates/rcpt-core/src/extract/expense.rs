//! Expense summary extraction from an expense-analysis response.

use tracing::debug;

use crate::models::expense::{ExpenseDocument, ExpenseField, ExpenseSummary, RawExpenseResponse};

use super::rules::{CurrencyAmountExtractor, DateExtractor, FieldExtractor};
use super::Result;

/// Separator between the parts of one line item.
const ITEM_PART_SEPARATOR: &str = " | ";

/// Which summary slot a typed field fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Vendor,
    Total,
    Date,
}

impl FieldKind {
    /// Classify a field by its lower-cased type text.
    fn classify(type_text: &str) -> Option<Self> {
        let t = type_text.to_lowercase();
        if t.contains("vendor") || t.contains("merchant") || t.contains("merchant_name") {
            Some(Self::Vendor)
        } else if t.contains("total") || t == "amount" {
            Some(Self::Total)
        } else if t.contains("date") {
            Some(Self::Date)
        } else {
            None
        }
    }
}

/// Builds an [`ExpenseSummary`] from the first document of a response.
///
/// Typed summary fields are the primary source. Whatever they leave unset for
/// total and date is then searched for in the serialized response, taking the
/// first match anywhere even when it comes from an unrelated field.
pub struct ExpenseFieldExtractor {
    amounts: CurrencyAmountExtractor,
    dates: DateExtractor,
}

impl ExpenseFieldExtractor {
    pub fn new() -> Self {
        Self {
            amounts: CurrencyAmountExtractor::new(),
            dates: DateExtractor::new(),
        }
    }

    /// Extract a summary tagged with `source`.
    ///
    /// Fails only when the response does not have the document shape at all;
    /// callers are expected to fall back to [`ExpenseSummary::empty`].
    pub fn extract(&self, response: &RawExpenseResponse, source: &str) -> Result<ExpenseSummary> {
        let mut summary = ExpenseSummary::empty(source);

        if let Some(doc) = response.first_document()? {
            self.apply_summary_fields(&doc, &mut summary);
            summary.items = self.line_items(&doc);
        }

        self.apply_fallback(&response.to_text(), &mut summary);

        debug!(
            "Extracted vendor={:?} total={:?} date={:?} items={}",
            summary.vendor,
            summary.total,
            summary.date,
            summary.items.len()
        );

        Ok(summary)
    }

    fn apply_summary_fields(&self, doc: &ExpenseDocument, summary: &mut ExpenseSummary) {
        for field in &doc.summary_fields {
            let Some(kind) = FieldKind::classify(field.type_text()) else {
                continue;
            };

            let value = Some(field_value(field).to_string());
            match kind {
                FieldKind::Vendor => summary.vendor = value,
                FieldKind::Total => summary.total = value,
                FieldKind::Date => summary.date = value,
            }
        }
    }

    fn line_items(&self, doc: &ExpenseDocument) -> Vec<String> {
        let mut items = Vec::new();

        for group in &doc.line_item_groups {
            for line in &group.line_items {
                let parts: Vec<String> = line
                    .line_item_expense_fields
                    .iter()
                    .filter_map(line_item_part)
                    .collect();

                if !parts.is_empty() {
                    items.push(parts.join(ITEM_PART_SEPARATOR));
                }
            }
        }

        items
    }

    fn apply_fallback(&self, text: &str, summary: &mut ExpenseSummary) {
        if is_unset(&summary.total) {
            if let Some(total) = self.amounts.extract(text) {
                debug!("Recovered total {} from raw response", total);
                summary.total = Some(total);
            }
        }

        if is_unset(&summary.date) {
            if let Some(date) = self.dates.extract(text) {
                debug!("Recovered date {} from raw response", date);
                summary.date = Some(date);
            }
        }
    }
}

impl Default for ExpenseFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Detected value, or the printed label when no value was detected.
fn field_value(field: &ExpenseField) -> &str {
    match field.value_text() {
        "" => field.label_text(),
        value => value,
    }
}

fn line_item_part(field: &ExpenseField) -> Option<String> {
    let name = field.type_text();
    let value = field.value_text();

    match (name.is_empty(), value.is_empty()) {
        (_, true) => None,
        (true, false) => Some(value.to_string()),
        (false, false) => Some(format!("{}: {}", name, value)),
    }
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
