//! Syntax validation for bucket names, prefixes, and object names.
//!
//! Bucket names follow the S3 naming rules: 3 to 63 characters, lowercase
//! alphanumerics with `.` and `-` in the middle, alphanumeric first and last
//! character, no successive periods, and no IPv4-literal form.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Maximum length of an object key or prefix accepted by the backend.
const MAX_PREFIX_LEN: usize = 1024;

static IPV4_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+").expect("IPv4 pattern should be valid")
});

static BUCKET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9.-]+[a-z0-9]$").expect("bucket name pattern should be valid")
});

/// Returns whether `bucket` is a syntactically valid bucket name.
pub fn is_valid_bucket_name(bucket: &str) -> bool {
    // bucket length should be no less than 3 and no more than 63 characters
    if bucket.len() < 3 || bucket.len() > 63 {
        return false;
    }
    // bucket with successive periods is invalid
    if bucket.contains("..") {
        return false;
    }
    // bucket cannot have ip address style
    if IPV4_STYLE.is_match(bucket) {
        return false;
    }
    // bucket should begin and end with alphabet/number,
    // with alphabet/number/.- in the middle
    BUCKET_NAME.is_match(bucket)
}

/// Validates a bucket name, returning [`Error::InvalidBucketName`] on failure.
pub fn validate_bucket_name(bucket: &str) -> Result<()> {
    if is_valid_bucket_name(bucket) {
        Ok(())
    } else {
        Err(Error::InvalidBucketName(bucket.to_string()))
    }
}

/// Returns whether `prefix` is a valid listing prefix.
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() <= MAX_PREFIX_LEN
}

/// Validates a listing prefix, returning [`Error::InvalidRequest`] on failure.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if is_valid_prefix(prefix) {
        Ok(())
    } else {
        Err(Error::InvalidRequest(format!(
            "prefix exceeds {} characters",
            MAX_PREFIX_LEN
        )))
    }
}

/// Returns whether `object_name` is a valid object key.
pub fn is_valid_object_name(object_name: &str) -> bool {
    is_valid_prefix(object_name) && !object_name.is_empty()
}

/// Validates an object key, returning [`Error::InvalidRequest`] on failure.
pub fn validate_object_name(object_name: &str) -> Result<()> {
    if is_valid_object_name(object_name) {
        Ok(())
    } else {
        Err(Error::InvalidRequest(
            "object name cannot be empty or exceed 1024 characters".to_string(),
        ))
    }
}
