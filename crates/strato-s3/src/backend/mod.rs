//! Consumed object-storage backend interface.
//!
//! This module defines [`ObjectStorage`], the trait through which the
//! service talks to an S3-compatible backend, together with the typed
//! request and page structs exchanged over it. Each trait method maps onto
//! exactly one backend operation; pagination cursors are carried through
//! unmodified so the listing loops in the service layer own the
//! continuation logic.
//!
//! [`AwsObjectStorage`] is the production implementation over the AWS S3
//! SDK; tests substitute scripted implementations.

mod aws;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;

pub use aws::AwsObjectStorage;

use crate::Result;
use crate::types::{
    BucketEntry, CopyConditions, CopyResult, ObjectEntry, ObjectStat, PutResult,
    ResponseHeaderOverrides, UploadEntry,
};

/// One page request of a ListObjects (v1) listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListObjectsRequest {
    /// Bucket to list.
    pub bucket: String,
    /// Key prefix filter.
    pub prefix: Option<String>,
    /// Grouping delimiter; `None` for a recursive listing.
    pub delimiter: Option<String>,
    /// Marker carried from the previous page's `next_marker`.
    pub marker: Option<String>,
}

/// One page request of a ListObjects v2 listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListObjectsV2Request {
    /// Bucket to list.
    pub bucket: String,
    /// Key prefix filter.
    pub prefix: Option<String>,
    /// Grouping delimiter; `None` for a recursive listing.
    pub delimiter: Option<String>,
    /// Key to start after, carried on every page request.
    pub start_after: Option<String>,
    /// Token carried from the previous page's `next_continuation_token`.
    pub continuation_token: Option<String>,
}

/// One page request of an in-progress multipart uploads listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListUploadsRequest {
    /// Bucket to list.
    pub bucket: String,
    /// Key prefix filter.
    pub prefix: Option<String>,
    /// Grouping delimiter; `None` for a recursive listing.
    pub delimiter: Option<String>,
    /// Key marker; advances together with the upload-id marker.
    pub key_marker: Option<String>,
    /// Upload-id marker; advances together with the key marker.
    pub upload_id_marker: Option<String>,
}

/// A put-object request.
#[derive(Debug, Clone, PartialEq)]
pub struct PutObjectRequest {
    /// Target bucket.
    pub bucket: String,
    /// Target object key.
    pub key: String,
    /// Object body.
    pub body: Bytes,
    /// Optional user metadata.
    pub metadata: Option<HashMap<String, String>>,
    /// Optional explicit content length.
    pub content_length: Option<i64>,
}

/// A copy-object request.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyObjectRequest {
    /// Target bucket.
    pub bucket: String,
    /// Target object key.
    pub key: String,
    /// Copy source (`bucket/key` form).
    pub source: String,
    /// Conditional copy headers.
    pub conditions: CopyConditions,
    /// Optional replacement metadata.
    pub metadata: Option<HashMap<String, String>>,
}

/// A presigned GET URL request.
#[derive(Debug, Clone, PartialEq)]
pub struct PresignedGetRequest {
    /// Target bucket.
    pub bucket: String,
    /// Target object key.
    pub key: String,
    /// URL validity window.
    pub expires: Duration,
    /// Signing date; defaults to now when unset.
    pub request_date: Option<OffsetDateTime>,
    /// Response-header overrides embedded in the URL.
    pub response_headers: ResponseHeaderOverrides,
}

/// A presigned PUT URL request.
#[derive(Debug, Clone, PartialEq)]
pub struct PresignedPutRequest {
    /// Target bucket.
    pub bucket: String,
    /// Target object key.
    pub key: String,
    /// URL validity window.
    pub expires: Duration,
}

/// One page of a ListObjects (v1) listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPage {
    /// Entries in backend order.
    pub entries: Vec<ObjectEntry>,
    /// Marker for the next page, when the backend returned one.
    pub next_marker: Option<String>,
    /// Whether more pages follow.
    pub is_truncated: bool,
}

/// One page of a ListObjects v2 listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPageV2 {
    /// Entries in backend order.
    pub entries: Vec<ObjectEntry>,
    /// Continuation token for the next page; absence terminates the listing.
    pub next_continuation_token: Option<String>,
}

/// One page of an in-progress multipart uploads listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPage {
    /// Uploads in backend order.
    pub uploads: Vec<UploadEntry>,
    /// Key marker for the next page.
    pub next_key_marker: Option<String>,
    /// Upload-id marker for the next page.
    pub next_upload_id_marker: Option<String>,
    /// Whether more pages follow.
    pub is_truncated: bool,
}

/// The object-storage backend surface consumed by the service.
///
/// Implementations issue exactly one backend call per method and pass
/// results through unmodified apart from field renaming; they never retry,
/// paginate, or cache.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Creates a bucket, returning the backend-reported location.
    async fn create_bucket(&self, bucket: &str, region: Option<&str>) -> Result<Option<String>>;

    /// Lists all buckets.
    async fn list_buckets(&self) -> Result<Vec<BucketEntry>>;

    /// Deletes a bucket.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Fetches one page of a ListObjects (v1) listing.
    async fn list_objects_page(&self, request: ListObjectsRequest) -> Result<ObjectPage>;

    /// Fetches one page of a ListObjects v2 listing.
    async fn list_objects_v2_page(&self, request: ListObjectsV2Request) -> Result<ObjectPageV2>;

    /// Fetches one page of an in-progress multipart uploads listing.
    async fn list_uploads_page(&self, request: ListUploadsRequest) -> Result<UploadPage>;

    /// Downloads an object, optionally restricted to a byte range
    /// (preformatted `bytes=...` header value).
    async fn get_object(&self, bucket: &str, key: &str, range: Option<&str>) -> Result<Bytes>;

    /// Uploads an object.
    async fn put_object(&self, request: PutObjectRequest) -> Result<PutResult>;

    /// Copies an object within the backend.
    async fn copy_object(&self, request: CopyObjectRequest) -> Result<CopyResult>;

    /// Reads object metadata without downloading the body.
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat>;

    /// Deletes a single object.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Deletes a batch of objects in one request, returning the deleted keys.
    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>>;

    /// Generates a presigned GET URL.
    async fn presigned_get_url(&self, request: PresignedGetRequest) -> Result<String>;

    /// Generates a presigned PUT URL.
    async fn presigned_put_url(&self, request: PresignedPutRequest) -> Result<String>;
}
