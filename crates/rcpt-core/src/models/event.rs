//! Storage trigger events.

use serde::Deserialize;
use serde_json::Value;

use crate::error::EventError;

/// A bucket/key pair naming one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Resolve the object named by the first record of a trigger event.
    ///
    /// Records after the first are ignored and never validated.
    pub fn from_event(event: &Value) -> Result<Self, EventError> {
        let records = event
            .get("Records")
            .and_then(Value::as_array)
            .ok_or_else(|| EventError::Malformed("missing Records list".to_string()))?;

        let first = records.first().ok_or(EventError::NoRecords)?;
        let record = EventRecord::deserialize(first)
            .map_err(|e| EventError::Malformed(e.to_string()))?;

        Ok(Self {
            bucket: record.s3.bucket.name,
            key: record.s3.object.key,
        })
    }

    /// Last path segment of the key.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

/// Build a single-record trigger event for an object.
pub fn event_for(object: &ObjectRef) -> Value {
    serde_json::json!({
        "Records": [{
            "s3": {
                "bucket": {"name": object.bucket},
                "object": {"key": object.key}
            }
        }]
    })
}
