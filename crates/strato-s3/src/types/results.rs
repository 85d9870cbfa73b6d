//! Results of write-side object operations.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Result of a put-object call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PutResult {
    /// ETag assigned to the stored object.
    pub etag: Option<String>,
}

impl PutResult {
    /// Creates a new PutResult.
    pub fn new(etag: impl Into<String>) -> Self {
        Self {
            etag: Some(etag.into()),
        }
    }
}

/// Result of a copy-object call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyResult {
    /// ETag of the copied object.
    pub etag: Option<String>,
    /// Last modified timestamp of the copy.
    pub last_modified: Option<OffsetDateTime>,
}

impl CopyResult {
    /// Sets the ETag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the last modified timestamp.
    pub fn with_last_modified(mut self, last_modified: OffsetDateTime) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}
