//! Trigger-driven pipeline stages.
//!
//! Each stage handles one storage event per call and holds no state between
//! calls. Redelivered events are processed again in full and overwrite the
//! same output keys.

mod model_stage;
mod ocr_stage;

pub use model_stage::ModelStage;
pub use ocr_stage::OcrStage;

use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::Result;
use crate::storage::BlobStore;

/// Payload of the marker written when persisting outputs fails.
pub const SAVE_FAILED_MARKER: &str = "ERROR saving outputs";

/// Trait for pipeline stages driven by storage events.
pub trait Stage {
    /// Process one trigger event.
    ///
    /// Skips are successful outcomes; malformed events, service failures and
    /// storage failures are returned as errors for the caller to retry.
    fn handle(&self, event: &Value) -> Result<StageOutcome>;
}

/// Successful result of handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The object was processed and artifacts were written.
    Completed { body: String },
    /// The object is not meant for this stage; nothing was written.
    Skipped { body: String },
}

impl StageOutcome {
    pub fn status_code(&self) -> u16 {
        200
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Completed { body } | Self::Skipped { body } => body,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Response in the `{statusCode, body}` shape trigger hosts expect.
    pub fn to_response(&self) -> Value {
        json!({
            "statusCode": self.status_code(),
            "body": self.body(),
        })
    }
}

/// Join an output prefix and a file name into an object key.
pub(crate) fn output_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        format!("{}{}", prefix, name)
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Best-effort diagnostic marker; a failed write is only logged.
pub(crate) fn write_marker<S: BlobStore + ?Sized>(store: &S, bucket: &str, key: &str, payload: &str) {
    match store.put(bucket, key, payload.as_bytes()) {
        Ok(()) => info!("Wrote error marker {}/{}", bucket, key),
        Err(e) => error!("Failed to write error marker {}/{}: {}", bucket, key, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_key() {
        assert_eq!(output_key("textract-output/", "a.jpg.summary.json"), "textract-output/a.jpg.summary.json");
        assert_eq!(output_key("out", "a.txt"), "out/a.txt");
        assert_eq!(output_key("", "a.txt"), "a.txt");
    }

    #[test]
    fn test_outcome_response() {
        let outcome = StageOutcome::Skipped {
            body: "skipped".to_string(),
        };
        assert!(outcome.is_skipped());
        assert_eq!(
            outcome.to_response(),
            json!({"statusCode": 200, "body": "skipped"})
        );
    }
}
