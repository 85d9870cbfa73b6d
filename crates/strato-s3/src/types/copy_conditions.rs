//! Conditional headers for copy-object calls.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Conditions to be satisfied before the backend allows an object copy.
///
/// Each set condition maps onto one `x-amz-copy-source-if-*` header; unset
/// conditions are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyConditions {
    /// Copy only if the source was modified since this instant.
    pub modified: Option<OffsetDateTime>,
    /// Copy only if the source was not modified since this instant.
    pub unmodified: Option<OffsetDateTime>,
    /// Copy only if the source ETag matches.
    pub match_etag: Option<String>,
    /// Copy only if the source ETag does not match.
    pub match_etag_except: Option<String>,
}

impl CopyConditions {
    /// Creates an empty set of conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the source to have been modified since `instant`.
    pub fn with_modified(mut self, instant: OffsetDateTime) -> Self {
        self.modified = Some(instant);
        self
    }

    /// Requires the source to be unmodified since `instant`.
    pub fn with_unmodified(mut self, instant: OffsetDateTime) -> Self {
        self.unmodified = Some(instant);
        self
    }

    /// Requires the source ETag to match `etag`.
    pub fn with_match_etag(mut self, etag: impl Into<String>) -> Self {
        self.match_etag = Some(etag.into());
        self
    }

    /// Requires the source ETag to differ from `etag`.
    pub fn with_match_etag_except(mut self, etag: impl Into<String>) -> Self {
        self.match_etag_except = Some(etag.into());
        self
    }
}
