//! Stage 2: expense summary to model summary and normalized record.

use serde_json::Value;
use tracing::{error, info};

use super::{output_key, write_marker, Stage, StageOutcome, SAVE_FAILED_MARKER};
use crate::error::{RcptError, Result};
use crate::llm::{ModelOutputParser, ModelRequest, PromptBuilder};
use crate::models::config::{ModelConfig, PipelineConfig};
use crate::models::event::ObjectRef;
use crate::models::expense::ExpenseSummary;
use crate::models::record::NormalizedRecord;
use crate::normalize::NormalizationStage;
use crate::services::TextModel;
use crate::storage::BlobStore;

/// Payload of the marker written when the model call fails.
const MODEL_FAILED_MARKER: &str = "bedrock_call_failed";

/// Summarizes expense summaries written by the OCR stage.
///
/// Writes `<base>.summary.txt` and `<base>.bedrock.json` under the model output
/// prefix, where `<base>` is the summary's file name without its suffix.
pub struct ModelStage<S, M> {
    store: S,
    model: M,
    prompts: PromptBuilder,
    parser: ModelOutputParser,
    normalizer: NormalizationStage,
    pipeline: PipelineConfig,
    config: ModelConfig,
}

impl<S: BlobStore, M: TextModel> ModelStage<S, M> {
    pub fn new(store: S, model: M, pipeline: PipelineConfig, config: ModelConfig) -> Self {
        Self {
            store,
            model,
            prompts: PromptBuilder::new(),
            parser: ModelOutputParser::new(),
            normalizer: NormalizationStage::new(),
            pipeline,
            config,
        }
    }

    fn accepts(&self, key: &str) -> bool {
        key.starts_with(&self.pipeline.ocr_output_prefix) && key.ends_with(&self.pipeline.summary_suffix)
    }

    fn load_summary(&self, object: &ObjectRef) -> Result<ExpenseSummary> {
        let body = self.store.get(&object.bucket, &object.key)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Prompt the model and reconcile its answer with the OCR summary.
    ///
    /// Returns the summary line and the normalized record.
    fn summarize(&self, object: &ObjectRef, base: &str, summary: &ExpenseSummary) -> Result<(String, NormalizedRecord)> {
        let prompt = self.prompts.build(summary);
        let request = ModelRequest::user_prompt(prompt, &self.config);

        info!("Calling model {} for key {}", self.config.model_id, object.key);
        let raw = self
            .model
            .invoke(&self.config.model_id, &request)
            .map_err(|e| {
                error!("Model call failed for {}: {}", object, e);
                let marker_key = self.marker_key(base);
                write_marker(&self.store, &object.bucket, &marker_key, MODEL_FAILED_MARKER);
                RcptError::from(e)
            })?;
        info!("Raw model output length: {}", raw.len());

        let parsed = self.parser.parse(&raw);
        let record = self.normalizer.normalize(&parsed, summary);
        Ok((parsed.summary_line, record))
    }

    fn persist(&self, bucket: &str, base: &str, summary_line: &str, record: &NormalizedRecord) -> Result<()> {
        let result = self.write_outputs(bucket, base, summary_line, record);
        if let Err(e) = &result {
            error!("Failed to save model outputs for {}: {}", base, e);
            write_marker(&self.store, bucket, &self.marker_key(base), SAVE_FAILED_MARKER);
        }
        result
    }

    fn write_outputs(&self, bucket: &str, base: &str, summary_line: &str, record: &NormalizedRecord) -> Result<()> {
        let prefix = &self.pipeline.model_output_prefix;
        self.store.put(
            bucket,
            &output_key(prefix, &format!("{}.summary.txt", base)),
            summary_line.as_bytes(),
        )?;
        let body = serde_json::to_vec_pretty(record)?;
        self.store
            .put(bucket, &output_key(prefix, &format!("{}.bedrock.json", base)), &body)?;
        Ok(())
    }

    fn marker_key(&self, base: &str) -> String {
        output_key(&self.pipeline.model_output_prefix, &format!("{}.error.txt", base))
    }
}

impl<S: BlobStore, M: TextModel> Stage for ModelStage<S, M> {
    fn handle(&self, event: &Value) -> Result<StageOutcome> {
        info!("Received event: {}", event);
        let object = ObjectRef::from_event(event)
            .inspect_err(|e| error!("Invalid event structure: {}", e))?;
        info!("Triggered for object: {}", object);

        if !self.accepts(&object.key) {
            info!("Skipping non-summary or wrong prefix: {}", object.key);
            return Ok(StageOutcome::Skipped {
                body: "skipped".to_string(),
            });
        }

        let summary = self
            .load_summary(&object)
            .inspect_err(|e| error!("Failed to load summary JSON from {}: {}", object, e))?;

        let base = object.file_name().replace(&self.pipeline.summary_suffix, "");
        let (summary_line, record) = self.summarize(&object, &base, &summary)?;
        self.persist(&object.bucket, &base, &summary_line, &record)?;

        info!("Saved model outputs for {}", object.key);
        Ok(StageOutcome::Completed {
            body: "Success".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ServiceError, StorageError};
    use crate::llm::ModelRawOutput;
    use crate::models::event::event_for;
    use crate::services;
    use crate::storage::{self, MemoryBlobStore};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed body and records the last request.
    struct StubModel {
        reply: String,
        last_request: Mutex<Option<(String, ModelRequest)>>,
    }

    impl StubModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_request: Mutex::new(None),
            }
        }
    }

    impl TextModel for StubModel {
        fn invoke(&self, model_id: &str, request: &ModelRequest) -> services::Result<ModelRawOutput> {
            *self.last_request.lock().unwrap() = Some((model_id.to_string(), request.clone()));
            Ok(ModelRawOutput::from(self.reply.as_str()))
        }
    }

    struct DownModel;

    impl TextModel for DownModel {
        fn invoke(&self, _model_id: &str, _request: &ModelRequest) -> services::Result<ModelRawOutput> {
            Err(ServiceError::Transport("connection refused".to_string()))
        }
    }

    /// Store that refuses every write, except error markers when allowed.
    struct RefusingStore {
        inner: MemoryBlobStore,
        allow_markers: bool,
    }

    impl BlobStore for RefusingStore {
        fn get(&self, bucket: &str, key: &str) -> storage::Result<Vec<u8>> {
            self.inner.get(bucket, key)
        }

        fn put(&self, bucket: &str, key: &str, body: &[u8]) -> storage::Result<()> {
            if self.allow_markers && key.ends_with(".error.txt") {
                return self.inner.put(bucket, key, body);
            }
            Err(StorageError::Write {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "access denied".to_string(),
            })
        }
    }

    const SUMMARY_KEY: &str = "textract-output/foo.jpg.summary.json";

    fn seeded_store() -> Arc<MemoryBlobStore> {
        let store = Arc::new(MemoryBlobStore::new());
        store
            .put(
                "receipts",
                SUMMARY_KEY,
                br#"{"Vendor":"Acme","Total":"$10.00","Date":"2024-01-01","Items":["Coffee"]}"#,
            )
            .unwrap();
        store
    }

    fn stage<S: BlobStore, M: TextModel>(store: S, model: M) -> ModelStage<S, M> {
        ModelStage::new(store, model, PipelineConfig::default(), ModelConfig::default())
    }

    #[test]
    fn test_skips_foreign_keys() {
        let store = seeded_store();
        let stage = stage(store.clone(), DownModel);

        for key in ["uploads/foo.jpg", "textract-output/foo.jpg.textract.json", "other/foo.jpg.summary.json"] {
            let outcome = stage.handle(&event_for(&ObjectRef::new("receipts", key))).unwrap();
            assert_eq!(outcome, StageOutcome::Skipped { body: "skipped".to_string() });
        }
        assert_eq!(store.keys("receipts"), vec![SUMMARY_KEY]);
    }

    #[test]
    fn test_writes_summary_and_record() {
        let store = seeded_store();
        let model = Arc::new(StubModel::new(
            "Coffee at Acme\n===JSON===\n{\"vendor\":\"Acme\",\"amount\":\"10\",\"currency\":\"USD\",\"category\":\"Dining\"}",
        ));
        let stage = stage(store.clone(), model.clone());

        let outcome = stage
            .handle(&event_for(&ObjectRef::new("receipts", SUMMARY_KEY)))
            .unwrap();
        assert_eq!(outcome.body(), "Success");

        let (model_id, request) = model.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(model_id, "anthropic.claude-3-haiku-20240307-v1:0");
        assert!(request.prompt_text().unwrap().contains("Vendor: Acme\nTotal: $10.00"));

        assert_eq!(
            store.get_string("receipts", "bedrock-output/foo.jpg.summary.txt").as_deref(),
            Some("Coffee at Acme")
        );
        let record: Value = serde_json::from_str(
            &store.get_string("receipts", "bedrock-output/foo.jpg.bedrock.json").unwrap(),
        )
        .unwrap();
        assert_eq!(
            record,
            json!({"vendor": "Acme", "amount": 10.0, "currency": "USD", "category": "Dining"})
        );
    }

    #[test]
    fn test_model_failure_writes_marker() {
        let store = seeded_store();
        let stage = stage(store.clone(), DownModel);

        let result = stage.handle(&event_for(&ObjectRef::new("receipts", SUMMARY_KEY)));
        assert!(matches!(result, Err(RcptError::Service(_))));
        assert_eq!(
            store.get_string("receipts", "bedrock-output/foo.jpg.error.txt").as_deref(),
            Some("bedrock_call_failed")
        );
        assert!(store.get_string("receipts", "bedrock-output/foo.jpg.bedrock.json").is_none());
    }

    fn refusing_store(allow_markers: bool) -> Arc<RefusingStore> {
        let inner = MemoryBlobStore::new();
        inner.put("receipts", SUMMARY_KEY, br#"{"Total": "$1.00"}"#).unwrap();
        Arc::new(RefusingStore {
            inner,
            allow_markers,
        })
    }

    #[test]
    fn test_save_failure_writes_marker() {
        let store = refusing_store(true);
        let stage = stage(store.clone(), StubModel::new("plain text"));

        let result = stage.handle(&event_for(&ObjectRef::new("receipts", SUMMARY_KEY)));
        assert!(matches!(
            result,
            Err(RcptError::Storage(StorageError::Write { ref key, .. }))
                if key == "bedrock-output/foo.jpg.summary.txt"
        ));
        assert_eq!(
            store.inner.get_string("receipts", "bedrock-output/foo.jpg.error.txt").as_deref(),
            Some("ERROR saving outputs")
        );
    }

    #[test]
    fn test_marker_failure_keeps_model_error() {
        let store = refusing_store(false);
        let stage = stage(store.clone(), DownModel);

        let result = stage.handle(&event_for(&ObjectRef::new("receipts", SUMMARY_KEY)));
        assert!(matches!(
            result,
            Err(RcptError::Service(ServiceError::Transport(_)))
        ));
        assert_eq!(store.inner.keys("receipts"), vec![SUMMARY_KEY]);
    }

    #[test]
    fn test_marker_failure_keeps_save_error() {
        let store = refusing_store(false);
        let stage = stage(store.clone(), StubModel::new("plain text"));

        let result = stage.handle(&event_for(&ObjectRef::new("receipts", SUMMARY_KEY)));
        assert!(matches!(
            result,
            Err(RcptError::Storage(StorageError::Write { ref key, .. }))
                if key == "bedrock-output/foo.jpg.summary.txt"
        ));
        assert_eq!(store.inner.keys("receipts"), vec![SUMMARY_KEY]);
    }

    #[test]
    fn test_missing_summary_fails_without_marker() {
        let store = Arc::new(MemoryBlobStore::new());
        let stage = stage(store.clone(), DownModel);

        let result = stage.handle(&event_for(&ObjectRef::new("receipts", SUMMARY_KEY)));
        assert!(matches!(result, Err(RcptError::Storage(StorageError::NotFound { .. }))));
        assert!(store.keys("receipts").is_empty());
    }

    #[test]
    fn test_invalid_summary_json() {
        let store = Arc::new(MemoryBlobStore::new());
        store.put("receipts", SUMMARY_KEY, b"not json").unwrap();
        let stage = stage(store.clone(), DownModel);

        let result = stage.handle(&event_for(&ObjectRef::new("receipts", SUMMARY_KEY)));
        assert!(matches!(result, Err(RcptError::Json(_))));
    }
}
