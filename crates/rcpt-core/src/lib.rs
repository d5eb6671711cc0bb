//! Core library for the two-stage receipt pipeline.
//!
//! This crate provides:
//! - Expense field extraction from OCR expense-analysis responses
//! - Amount parsing and currency detection heuristics
//! - Prompt rendering and model output parsing
//! - Normalization of model records against the OCR summary
//! - Event-driven OCR and model stages over a pluggable blob store

pub mod error;
pub mod extract;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod services;
pub mod storage;

pub use error::{RcptError, Result};
pub use extract::ExpenseFieldExtractor;
pub use extract::rules::{detect_currency, parse_amount};
pub use llm::{ModelOutputParser, ModelRawOutput, ModelRequest, PromptBuilder, JSON_SEPARATOR};
pub use models::config::RcptConfig;
pub use models::event::ObjectRef;
pub use models::expense::{ExpenseSummary, RawExpenseResponse};
pub use models::record::{NormalizedRecord, ParsedModelOutput};
pub use normalize::NormalizationStage;
pub use pipeline::{ModelStage, OcrStage, Stage, StageOutcome};
pub use services::{ExpenseAnalyzer, TextModel};
#[cfg(feature = "http")]
pub use services::{HttpExpenseAnalyzer, HttpTextModel};
pub use storage::{BlobStore, LocalBlobStore, MemoryBlobStore};
