//! Blob store backed by a local directory tree.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::{BlobStore, Result};
use crate::error::StorageError;

/// Stores each bucket as a sub-directory of `root` and each key as a relative
/// path inside it.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path of an object. Keys must stay inside their bucket.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for (name, what) in [(bucket, "bucket"), (key, "key")] {
            let relative = Path::new(name);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if name.is_empty() || escapes {
                return Err(StorageError::InvalidKey(format!("{} {:?}", what, name)));
            }
            path.push(relative);
        }
        Ok(path)
    }
}

impl BlobStore for LocalBlobStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        debug!("Reading {}", path.display());

        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => StorageError::Read {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            },
        })
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        debug!("Writing {} ({} bytes)", path.display(), body.len());

        let write_err = |e: std::io::Error| StorageError::Write {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&path, body).map_err(write_err)
    }
}
