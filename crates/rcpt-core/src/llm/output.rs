//! Parsing of raw model responses into a summary line and JSON fields.

use serde_json::{Map, Value};
use tracing::debug;

use crate::extract::rules::patterns::JSON_OBJECT;
use crate::models::record::ParsedModelOutput;

use super::prompt::JSON_SEPARATOR;

/// Raw response bytes returned by the model runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRawOutput(Vec<u8>);

impl ModelRawOutput {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ModelRawOutput {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&str> for ModelRawOutput {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// Turns a model response into [`ParsedModelOutput`].
///
/// The envelope layout differs between provider versions, so the generated
/// text is located by trying the current layout, then the legacy one, then any
/// string under a `text` key. Parsing never fails: unrecoverable JSON yields an
/// empty field map.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelOutputParser;

impl ModelOutputParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &ModelRawOutput) -> ParsedModelOutput {
        let text = self.extract_text(raw);
        debug!("Model text length: {}", text.len());
        self.split(&text)
    }

    /// Generated text inside the provider envelope, or the whole body when it
    /// is not a JSON envelope.
    pub fn extract_text(&self, raw: &ModelRawOutput) -> String {
        let body = String::from_utf8_lossy(raw.as_bytes());

        let Ok(envelope) = serde_json::from_str::<Value>(&body) else {
            return body.into_owned();
        };

        content_text(&envelope)
            .or_else(|| legacy_outputs_text(&envelope))
            .or_else(|| find_text(&envelope))
            .map(str::to_string)
            .unwrap_or_else(|| body.into_owned())
    }

    /// Split generated text on the separator and recover the JSON object.
    pub fn split(&self, text: &str) -> ParsedModelOutput {
        let Some((summary, candidate)) = text.split_once(JSON_SEPARATOR) else {
            return ParsedModelOutput {
                summary_line: text.trim().to_string(),
                fields: Map::new(),
            };
        };

        let candidate = candidate.trim();
        let fields = if candidate.is_empty() {
            Map::new()
        } else {
            parse_object(candidate)
                .or_else(|| {
                    debug!("JSON after separator is invalid, scanning whole text");
                    JSON_OBJECT
                        .find(text)
                        .and_then(|m| parse_object(m.as_str()))
                })
                .unwrap_or_default()
        };

        ParsedModelOutput {
            summary_line: summary.trim().to_string(),
            fields,
        }
    }
}

fn parse_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(s) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn non_empty_text(block: &Value) -> Option<&str> {
    block
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

fn is_type(block: &Value, kind: &str) -> bool {
    block.get("type").and_then(Value::as_str) == Some(kind)
}

/// First text block in a content list.
fn first_text_block(content: &Value) -> Option<&str> {
    content
        .as_array()?
        .iter()
        .filter(|block| is_type(block, "text"))
        .find_map(non_empty_text)
}

/// Current layout: `output.content[] {type: "text"}`.
fn content_text(envelope: &Value) -> Option<&str> {
    first_text_block(envelope.get("output")?.get("content")?)
}

/// Legacy layout: `outputs[] {type: "message"} .content[] {type: "text"}`.
fn legacy_outputs_text(envelope: &Value) -> Option<&str> {
    envelope
        .get("outputs")?
        .as_array()?
        .iter()
        .filter(|out| is_type(out, "message"))
        .find_map(|out| first_text_block(out.get("content")?))
}

/// Depth-first search for a string stored under a `text` key. Object entries
/// are visited in document order.
///
/// A string `text` entry ends the search of its object; when it is empty the
/// search resumes at the object's next sibling.
fn find_text(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if let (true, Value::String(s)) = (key == "text", child) {
                    return Some(s.as_str()).filter(|s| !s.is_empty());
                }
                if let Some(found) = find_text(child) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(find_text),
        _ => None,
    }
}
