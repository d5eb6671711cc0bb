//! In-process blob store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{BlobStore, Result};
use crate::error::StorageError;

/// Blob store holding every object in memory.
///
/// Used for dry runs and tests; contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored in `bucket`, in lexical order.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Object body decoded as UTF-8, if present.
    pub fn get_string(&self, bucket: &str, key: &str) -> Option<String> {
        self.lock()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), Vec<u8>>> {
        // A poisoned map is still structurally valid.
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        self.lock()
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
        Ok(())
    }
}
