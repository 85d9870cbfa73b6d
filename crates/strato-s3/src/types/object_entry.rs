//! Object listing entries.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An object as reported by a paginated listing.
///
/// Fields pass through what the backend returned for the page the entry
/// appeared on; the lister never synthesizes or rewrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Object key/path.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modified timestamp.
    pub last_modified: Option<OffsetDateTime>,
    /// ETag of the object.
    pub etag: Option<String>,
}

impl ObjectEntry {
    /// Creates a new ObjectEntry.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            etag: None,
        }
    }

    /// Sets the last modified timestamp.
    pub fn with_last_modified(mut self, last_modified: OffsetDateTime) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Sets the ETag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}
