pub mod config;
pub mod extract;
pub mod handle;
pub mod parse;
pub mod prompt;

use std::path::Path;

use anyhow::Context;

/// Read a JSON document from disk.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}
