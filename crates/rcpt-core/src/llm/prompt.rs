//! Prompt rendering for the summarization model.

use crate::models::expense::ExpenseSummary;

/// Literal line separating the summary sentence from the JSON object in the
/// model's reply. Case-sensitive.
pub const JSON_SEPARATOR: &str = "===JSON===";

/// Marker rendered in place of an empty item list.
const NO_ITEMS: &str = "(none)";

/// Renders an [`ExpenseSummary`] into the fixed model prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, summary: &ExpenseSummary) -> String {
        let vendor = summary.vendor.as_deref().unwrap_or("");
        let total = summary.total.as_deref().unwrap_or("");
        let date = summary.date.as_deref().unwrap_or("");

        let items_text = if summary.items.is_empty() {
            NO_ITEMS.to_string()
        } else {
            summary
                .items
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Human: You are an expert assistant that converts extracted receipt data into a friendly one-line summary and a normalized JSON object.
Here is the extracted data:

Vendor: {vendor}
Total: {total}
Date: {date}
Items:
{items_text}

Task:
1) Produce a one-line English summary (concise).
2) Produce ONLY valid JSON (no trailing text) with keys:
   - vendor (string),
   - date (ISO 8601 YYYY-MM-DD or empty string),
   - amount (number or null),
   - currency (string or empty),
   - items (array of strings),
   - category (short string classification like 'Groceries','Transport','Auto','Dining','Other').

Return first the one-line summary, then on a new line write exactly:
{JSON_SEPARATOR}
and then the JSON only.

Assistant:"
        )
    }
}
