//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// The trigger event could not yield a bucket/key pair.
    #[error("invalid trigger event: {0}")]
    Event(#[from] EventError),

    /// Blob store read or write failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// External service (expense analysis or text model) failed.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while validating a trigger event.
#[derive(Error, Debug)]
pub enum EventError {
    /// The event is not valid JSON or does not have the record shape.
    #[error("malformed event: {0}")]
    Malformed(String),

    /// The event carries no records.
    #[error("event has no records")]
    NoRecords,
}

/// Errors related to the blob store boundary.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The object key cannot be mapped onto the store.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Reading an object failed.
    #[error("failed to read {bucket}/{key}: {reason}")]
    Read {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Writing an object failed.
    #[error("failed to write {bucket}/{key}: {reason}")]
    Write {
        bucket: String,
        key: String,
        reason: String,
    },
}

/// Errors related to the external services.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with a body that could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The service is not configured.
    #[error("service not configured: {0}")]
    NotConfigured(String),
}

/// Errors related to expense field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The response does not have the expected document shape.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
