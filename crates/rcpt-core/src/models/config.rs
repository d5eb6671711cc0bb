//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RcptError, Result};

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Key layout of both stages.
    pub pipeline: PipelineConfig,

    /// Text-generation model settings.
    pub model: ModelConfig,

    /// Expense-analysis service settings.
    pub analyzer: AnalyzerConfig,

    /// Local blob store settings.
    pub storage: StorageConfig,
}

/// Object key layout shared by the OCR and model stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Prefix the OCR stage writes under (and the model stage reads from).
    pub ocr_output_prefix: String,

    /// Prefix the model stage writes under.
    pub model_output_prefix: String,

    /// Lower-case suffixes of documents the OCR stage accepts.
    pub document_suffixes: Vec<String>,

    /// Suffix of summary artifacts consumed by the model stage.
    pub summary_suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ocr_output_prefix: "textract-output/".to_string(),
            model_output_prefix: "bedrock-output/".to_string(),
            document_suffixes: vec![
                ".jpg".to_string(),
                ".jpeg".to_string(),
                ".png".to_string(),
                ".pdf".to_string(),
            ],
            summary_suffix: ".summary.json".to_string(),
        }
    }
}

/// Text-generation model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier passed to the invoke endpoint.
    pub model_id: String,

    /// Base URL of the model runtime.
    pub endpoint: String,

    /// Messages protocol version sent with every request.
    pub protocol_version: String,

    /// Maximum number of tokens the model may generate.
    pub max_output_tokens: u32,

    /// Sampling temperature (lower is more deterministic).
    pub temperature: f32,

    /// Environment variable holding a bearer token, if any.
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
            endpoint: "https://bedrock-runtime.us-east-1.amazonaws.com".to_string(),
            protocol_version: "bedrock-2023-05-31".to_string(),
            max_output_tokens: 400,
            temperature: 0.2,
            api_key_env: Some("AWS_BEARER_TOKEN_BEDROCK".to_string()),
            timeout_secs: 60,
        }
    }
}

/// Expense-analysis service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// URL accepting a raw document body and answering with an
    /// expense-analysis JSON document. Unset disables the OCR stage.
    pub endpoint: Option<String>,

    /// Environment variable holding a bearer token, if any.
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: None,
            timeout_secs: 120,
        }
    }
}

/// Local blob store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per bucket.
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("buckets"),
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RcptError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
