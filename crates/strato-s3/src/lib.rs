#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![allow(clippy::result_large_err)]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CLIENT: &str = "strato_s3::client";
pub const TRACING_TARGET_SERVICE: &str = "strato_s3::service";
pub const TRACING_TARGET_BUCKETS: &str = "strato_s3::buckets";
pub const TRACING_TARGET_OBJECTS: &str = "strato_s3::objects";
pub const TRACING_TARGET_HEALTH: &str = "strato_s3::health";

pub mod backend;
pub mod client;
pub mod service;
pub mod types;

// Re-export for convenience
pub use crate::backend::{AwsObjectStorage, ObjectStorage};
pub use crate::client::{S3Config, S3Credentials};
pub use crate::service::S3Service;
pub use crate::types::{
    BucketEntry, CopyConditions, CopyResult, ObjectEntry, ObjectStat, PutResult, UploadEntry,
    is_valid_bucket_name,
};

/// Error type for object storage operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// Configuration error.
    ///
    /// This includes invalid configuration parameters, missing required
    /// settings, or malformed endpoint URLs detected during client
    /// construction.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service could not be initialized.
    ///
    /// Raised when the mandatory startup health probe fails or times out.
    /// Carries the underlying cause message. Not retryable.
    #[error("S3 can not be initialized: {0}")]
    Initialization(String),

    /// The backend did not answer a health probe within the timeout.
    ///
    /// Retryable: the backend may become reachable again.
    #[error("S3 backend not reachable (timed out after {timeout:?})")]
    Ping {
        /// The probe timeout that elapsed.
        timeout: std::time::Duration,
    },

    /// A bucket name failed syntax validation.
    ///
    /// Raised locally, before any backend call is issued.
    #[error("Invalid bucket name: {0}")]
    InvalidBucketName(String),

    /// Invalid request parameters or malformed data.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error propagated from the storage backend.
    ///
    /// Carries the HTTP status code when the backend returned one, so
    /// callers can distinguish client-side (4xx) from server-side (5xx)
    /// failures without depending on the SDK's error types.
    #[error("Backend error: {message}")]
    Backend {
        /// Error message from the backend SDK.
        message: String,
        /// HTTP status code, when the failure carried one.
        status_code: Option<u16>,
    },

    /// I/O operation failed.
    ///
    /// Local filesystem failures while reading upload sources or writing
    /// download targets.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns whether this error indicates a configuration issue.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Returns whether this error was raised by local parameter validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::InvalidBucketName(_) | Error::InvalidRequest(_))
    }

    /// Returns whether this error should trigger an automatic retry.
    ///
    /// Only the health-probe timeout and server-side backend failures are
    /// likely to succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Ping { .. } => true,
            Error::Backend { status_code, .. } => {
                matches!(status_code, Some(code) if (500..600).contains(code))
            }
            Error::Io(_) => true,
            Error::Config(_)
            | Error::Initialization(_)
            | Error::InvalidBucketName(_)
            | Error::InvalidRequest(_) => false,
        }
    }

    /// Returns the HTTP status code attached to a backend failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Backend { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Returns whether the backend rejected the request with a 4xx status.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code(), Some(code) if (400..500).contains(&code))
    }
}

/// Specialized [`Result`] type for object storage operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
