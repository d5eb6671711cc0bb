//! Prompting and response parsing for the summarization model.

mod output;
mod prompt;
mod request;

pub use output::{ModelOutputParser, ModelRawOutput};
pub use prompt::{PromptBuilder, JSON_SEPARATOR};
pub use request::{ContentBlock, Message, ModelRequest};
