//! Bucket listing entries.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A bucket as reported by the backend's list-buckets call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketEntry {
    /// Bucket name.
    pub name: String,
    /// Bucket creation date, when the backend reports one.
    pub creation_date: Option<OffsetDateTime>,
}

impl BucketEntry {
    /// Creates a new BucketEntry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creation_date: None,
        }
    }

    /// Sets the creation date.
    pub fn with_creation_date(mut self, creation_date: OffsetDateTime) -> Self {
        self.creation_date = Some(creation_date);
        self
    }
}
