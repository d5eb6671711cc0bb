//! Stage 1: receipt document to expense summary.

use serde_json::{json, Value};
use tracing::{error, info};

use super::{output_key, write_marker, Stage, StageOutcome, SAVE_FAILED_MARKER};
use crate::error::{RcptError, Result};
use crate::extract::ExpenseFieldExtractor;
use crate::models::config::PipelineConfig;
use crate::models::event::ObjectRef;
use crate::models::expense::{ExpenseSummary, RawExpenseResponse};
use crate::services::ExpenseAnalyzer;
use crate::storage::BlobStore;

/// Payload of the marker written when the analysis call fails.
const ANALYZE_FAILED_MARKER: &str = "textract_call_failed";

/// Runs expense analysis on new receipt uploads.
///
/// Writes `<name>.textract.json` and `<name>.summary.json` under the OCR output
/// prefix, where `<name>` is the uploaded object's file name.
pub struct OcrStage<S, A> {
    store: S,
    analyzer: A,
    extractor: ExpenseFieldExtractor,
    config: PipelineConfig,
}

impl<S: BlobStore, A: ExpenseAnalyzer> OcrStage<S, A> {
    pub fn new(store: S, analyzer: A, config: PipelineConfig) -> Self {
        Self {
            store,
            analyzer,
            extractor: ExpenseFieldExtractor::new(),
            config,
        }
    }

    /// Reason to skip `key`, if any.
    fn skip_reason(&self, key: &str) -> Option<&'static str> {
        if key.starts_with(&self.config.ocr_output_prefix) {
            info!("Skipping object in output prefix: {}", key);
            return Some("skipped - output file");
        }

        let lower = key.to_lowercase();
        let accepted = self
            .config
            .document_suffixes
            .iter()
            .any(|suffix| lower.ends_with(suffix.as_str()));
        if !accepted {
            info!("Skipping non-image/pdf file: {}", key);
            return Some("skipped - not an image/pdf");
        }

        None
    }

    fn analyze(&self, object: &ObjectRef) -> Result<RawExpenseResponse> {
        let local = self
            .store
            .download_to_local(&object.bucket, &object.key)
            .inspect_err(|e| error!("Failed to download {}: {}", object, e))?;
        let document = std::fs::read(local.path())?;

        let marker_key = output_key(
            &self.config.ocr_output_prefix,
            &format!("{}.error.txt", object.file_name()),
        );
        self.analyzer.analyze(&document).map_err(|e| {
            error!("Expense analysis failed for {}: {}", object, e);
            write_marker(&self.store, &object.bucket, &marker_key, ANALYZE_FAILED_MARKER);
            RcptError::from(e)
        })
    }

    fn summarize(&self, response: &RawExpenseResponse, name: &str) -> ExpenseSummary {
        match self.extractor.extract(response, name) {
            Ok(summary) => summary,
            Err(e) => {
                error!("Parsing expense response failed for {}: {}", name, e);
                ExpenseSummary::empty(name)
            }
        }
    }

    fn persist(
        &self,
        bucket: &str,
        name: &str,
        response: &RawExpenseResponse,
        summary: &ExpenseSummary,
    ) -> Result<()> {
        let prefix = &self.config.ocr_output_prefix;
        let raw_key = output_key(prefix, &format!("{}.textract.json", name));
        let summary_key = output_key(prefix, &format!("{}.summary.json", name));

        let result = self.write_outputs(bucket, &raw_key, response, &summary_key, summary);
        if let Err(e) = &result {
            error!("Failed to save outputs for {}: {}", name, e);
            let marker_key = output_key(prefix, &format!("{}.error.txt", name));
            write_marker(&self.store, bucket, &marker_key, SAVE_FAILED_MARKER);
        }
        result
    }

    fn write_outputs(
        &self,
        bucket: &str,
        raw_key: &str,
        response: &RawExpenseResponse,
        summary_key: &str,
        summary: &ExpenseSummary,
    ) -> Result<()> {
        self.store.put(bucket, raw_key, response.to_text().as_bytes())?;
        let body = serde_json::to_vec_pretty(summary)?;
        self.store.put(bucket, summary_key, &body)?;
        Ok(())
    }
}

impl<S: BlobStore, A: ExpenseAnalyzer> Stage for OcrStage<S, A> {
    fn handle(&self, event: &Value) -> Result<StageOutcome> {
        info!("Received event: {}", event);
        let object = ObjectRef::from_event(event)
            .inspect_err(|e| error!("Invalid event structure: {}", e))?;
        info!("Processing object: {}", object);

        if let Some(reason) = self.skip_reason(&object.key) {
            return Ok(StageOutcome::Skipped {
                body: json!({ "message": reason }).to_string(),
            });
        }

        let response = self.analyze(&object)?;
        let name = object.file_name();
        let summary = self.summarize(&response, name);
        self.persist(&object.bucket, name, &response, &summary)?;

        info!(
            "Saved outputs in {}/{}{}*",
            object.bucket, self.config.ocr_output_prefix, name
        );
        Ok(StageOutcome::Completed {
            body: serde_json::to_string(&summary)?,
        })
    }
}
