//! Data types for object storage operations.
//!
//! This module provides the records exchanged with the service: listing
//! entries for objects, buckets, and in-progress multipart uploads, object
//! metadata snapshots, copy conditions, and presigned-URL parameter types.
//! All fields mirror what the backend returns, renamed to Rust conventions.

mod bucket_entry;
mod bucket_name;
mod copy_conditions;
mod object_entry;
mod object_stat;
mod response_headers;
mod results;
mod upload_entry;

pub use bucket_entry::BucketEntry;
pub use bucket_name::{
    is_valid_bucket_name, is_valid_object_name, is_valid_prefix, validate_bucket_name,
    validate_object_name, validate_prefix,
};
pub use copy_conditions::CopyConditions;
pub use object_entry::ObjectEntry;
pub use object_stat::ObjectStat;
pub use response_headers::ResponseHeaderOverrides;
pub use results::{CopyResult, PutResult};
pub use upload_entry::UploadEntry;
