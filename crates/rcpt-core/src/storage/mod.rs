//! Blob store boundary.

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use std::io::Write;

use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Trait for object stores addressed by bucket and key.
///
/// Implementations are not transactional; every call may fail independently.
pub trait BlobStore: Send + Sync {
    /// Read a whole object.
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Create or overwrite an object.
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()>;

    /// Copy an object into a local temporary file.
    ///
    /// The file is removed when the returned handle is dropped.
    fn download_to_local(&self, bucket: &str, key: &str) -> Result<NamedTempFile> {
        let body = self.get(bucket, key)?;
        let io_err = |e: std::io::Error| StorageError::Read {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        };

        let mut file = NamedTempFile::new().map_err(io_err)?;
        file.write_all(&body).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(file)
    }
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        (**self).get(bucket, key)
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        (**self).put(bucket, key, body)
    }

    fn download_to_local(&self, bucket: &str, key: &str) -> Result<NamedTempFile> {
        (**self).download_to_local(bucket, key)
    }
}
