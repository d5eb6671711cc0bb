//! External service boundaries: expense analysis and text generation.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpExpenseAnalyzer, HttpTextModel};

use crate::error::ServiceError;
use crate::llm::{ModelRawOutput, ModelRequest};
use crate::models::expense::RawExpenseResponse;

/// Result type for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Trait for OCR expense-analysis services.
pub trait ExpenseAnalyzer: Send + Sync {
    /// Analyze one receipt image or PDF.
    fn analyze(&self, document: &[u8]) -> Result<RawExpenseResponse>;
}

/// Trait for text-generation model runtimes.
pub trait TextModel: Send + Sync {
    /// Invoke `model_id` with a request body and return the raw response.
    fn invoke(&self, model_id: &str, request: &ModelRequest) -> Result<ModelRawOutput>;
}

impl<T: ExpenseAnalyzer + ?Sized> ExpenseAnalyzer for std::sync::Arc<T> {
    fn analyze(&self, document: &[u8]) -> Result<RawExpenseResponse> {
        (**self).analyze(document)
    }
}

impl<T: TextModel + ?Sized> TextModel for std::sync::Arc<T> {
    fn invoke(&self, model_id: &str, request: &ModelRequest) -> Result<ModelRawOutput> {
        (**self).invoke(model_id, request)
    }
}
