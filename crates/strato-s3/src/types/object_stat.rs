//! Object metadata snapshots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Metadata of an object as reported by a head-object call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectStat {
    /// Object size in bytes.
    pub size: u64,
    /// ETag of the object.
    pub etag: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<OffsetDateTime>,
    /// Content type/MIME type.
    pub content_type: Option<String>,
    /// User-defined object metadata.
    pub metadata: HashMap<String, String>,
}

impl ObjectStat {
    /// Creates a new ObjectStat with the given size.
    pub fn new(size: u64) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

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

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets user metadata.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}
