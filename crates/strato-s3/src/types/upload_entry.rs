//! In-progress multipart upload entries.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An in-progress multipart upload as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEntry {
    /// Object key the upload targets.
    pub key: String,
    /// Backend-assigned upload identifier.
    pub upload_id: String,
    /// When the upload was initiated.
    pub initiated: Option<OffsetDateTime>,
}

impl UploadEntry {
    /// Creates a new UploadEntry.
    pub fn new(key: impl Into<String>, upload_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            upload_id: upload_id.into(),
            initiated: None,
        }
    }

    /// Sets the initiation timestamp.
    pub fn with_initiated(mut self, initiated: OffsetDateTime) -> Self {
        self.initiated = Some(initiated);
        self
    }
}
