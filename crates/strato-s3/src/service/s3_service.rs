//! The object storage service.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{
    AwsObjectStorage, CopyObjectRequest, ObjectStorage, PresignedGetRequest, PresignedPutRequest,
    PutObjectRequest,
};
use crate::client::S3Config;
use crate::service::health::{self, DEFAULT_PING_TIMEOUT};
use crate::service::listing;
use crate::types::{
    BucketEntry, CopyConditions, CopyResult, ObjectEntry, ObjectStat, PutResult,
    ResponseHeaderOverrides, UploadEntry, validate_bucket_name, validate_object_name,
};
use crate::{
    Error, Result, TRACING_TARGET_BUCKETS, TRACING_TARGET_OBJECTS, TRACING_TARGET_SERVICE,
};

/// Default lifetime of presigned URLs.
pub const DEFAULT_PRESIGNED_EXPIRES: Duration = Duration::from_secs(3600);

/// Object storage service over an S3-compatible backend.
///
/// Construction validates the configuration and builds the backend clients
/// but performs no network I/O. [`start`](Self::start) probes the backend
/// once and arms the recurring health probe; a failed startup probe is
/// fatal. [`stop`](Self::stop) disarms the probe.
pub struct S3Service {
    config: Arc<S3Config>,
    backend: Arc<dyn ObjectStorage>,
    healthy: Arc<AtomicBool>,
    probe: Mutex<Option<JoinHandle<()>>>,
}

impl S3Service {
    /// Creates a service backed by the AWS SDK client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration fails validation.
    pub fn new(config: S3Config) -> Result<Self> {
        let backend = AwsObjectStorage::new(config.clone())?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Creates a service over an arbitrary backend implementation.
    pub fn with_backend(config: S3Config, backend: Arc<dyn ObjectStorage>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            healthy: Arc::new(AtomicBool::new(false)),
            probe: Mutex::new(None),
        }
    }

    /// Probes the backend and arms the recurring health probe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] when the backend can not be
    /// reached within the startup probe timeout.
    pub async fn start(&self) -> Result<()> {
        info!(
            target: TRACING_TARGET_SERVICE,
            endpoint = %self.config.endpoint_masked(),
            "Starting S3 service"
        );

        health::ping(self.backend.as_ref(), DEFAULT_PING_TIMEOUT)
            .await
            .map_err(|e| Error::Initialization(e.to_string()))?;
        self.healthy.store(true, Ordering::Relaxed);

        match self.config.health_check_interval() {
            Some(interval) => {
                let handle = health::spawn_probe(
                    Arc::clone(&self.backend),
                    interval,
                    Arc::clone(&self.healthy),
                );
                *self.probe.lock().unwrap() = Some(handle);
                debug!(
                    target: TRACING_TARGET_SERVICE,
                    interval = ?interval,
                    "Health probe armed"
                );
            }
            None => {
                warn!(
                    target: TRACING_TARGET_SERVICE,
                    "Health probe disabled, backend reachability will not be monitored"
                );
            }
        }

        info!(target: TRACING_TARGET_SERVICE, "S3 service started");
        Ok(())
    }

    /// Disarms the recurring health probe.
    pub fn stop(&self) {
        if let Some(handle) = self.probe.lock().unwrap().take() {
            handle.abort();
            debug!(target: TRACING_TARGET_SERVICE, "Health probe disarmed");
        }
        self.healthy.store(false, Ordering::Relaxed);
        info!(target: TRACING_TARGET_SERVICE, "S3 service stopped");
    }

    /// Outcome of the most recent health probe.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn probe_armed(&self) -> bool {
        self.probe.lock().unwrap().is_some()
    }

    /// Probes the backend once with a bounded wait.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Ping`] when the wait elapses before the backend
    /// answers; backend failures propagate unchanged.
    pub async fn ping(&self, timeout: Option<Duration>) -> Result<bool> {
        health::ping(
            self.backend.as_ref(),
            timeout.unwrap_or(DEFAULT_PING_TIMEOUT),
        )
        .await
    }

    /// Creates a bucket, returning the location reported by the backend.
    pub async fn make_bucket(&self, bucket: &str, region: Option<&str>) -> Result<Option<String>> {
        validate_bucket_name(bucket)?;

        let location = self.backend.create_bucket(bucket, region).await?;
        info!(
            target: TRACING_TARGET_BUCKETS,
            bucket = %bucket,
            region = region.unwrap_or_default(),
            "Bucket created"
        );
        Ok(location)
    }

    /// Lists all buckets owned by the configured credentials.
    pub async fn list_buckets(&self) -> Result<Vec<BucketEntry>> {
        self.backend.list_buckets().await
    }

    /// Checks whether a bucket exists among the owned buckets.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        validate_bucket_name(bucket)?;

        let buckets = self.backend.list_buckets().await?;
        Ok(buckets.iter().any(|entry| entry.name == bucket))
    }

    /// Deletes a bucket.
    ///
    /// Returns `false` instead of an error when the backend answers with a
    /// client error, so that deleting a missing bucket is not fatal.
    pub async fn remove_bucket(&self, bucket: &str) -> Result<bool> {
        validate_bucket_name(bucket)?;

        match self.backend.delete_bucket(bucket).await {
            Ok(()) => {
                info!(target: TRACING_TARGET_BUCKETS, bucket = %bucket, "Bucket removed");
                Ok(true)
            }
            Err(e) if e.is_client_error() => {
                debug!(
                    target: TRACING_TARGET_BUCKETS,
                    bucket = %bucket,
                    error = %e,
                    "Bucket removal rejected"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Lists objects under a prefix, fetching every page.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        recursive: bool,
    ) -> Result<Vec<ObjectEntry>> {
        listing::list_objects_all(self.backend.as_ref(), bucket, prefix, recursive).await
    }

    /// Lists objects under a prefix with the v2 listing, fetching every page.
    pub async fn list_objects_v2(
        &self,
        bucket: &str,
        prefix: &str,
        recursive: bool,
        start_after: Option<&str>,
    ) -> Result<Vec<ObjectEntry>> {
        listing::list_objects_v2_all(self.backend.as_ref(), bucket, prefix, recursive, start_after)
            .await
    }

    /// Lists in-progress multipart uploads under a prefix.
    pub async fn list_incomplete_uploads(
        &self,
        bucket: &str,
        prefix: &str,
        recursive: bool,
    ) -> Result<Vec<UploadEntry>> {
        listing::list_uploads_all(
            self.backend.as_ref(),
            bucket,
            prefix,
            "",
            "",
            listing::delimiter_for(recursive),
        )
        .await
    }

    /// Downloads a whole object.
    pub async fn get_object(&self, bucket: &str, object: &str) -> Result<Bytes> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        let body = self.backend.get_object(bucket, object, None).await?;
        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            size = body.len(),
            "Object fetched"
        );
        Ok(body)
    }

    /// Downloads a byte range of an object.
    ///
    /// A zero length means "to the end of the object"; offset zero with no
    /// length degenerates to a whole-object fetch.
    pub async fn get_partial_object(
        &self,
        bucket: &str,
        object: &str,
        offset: u64,
        length: Option<u64>,
    ) -> Result<Bytes> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        let range = format_range(offset, length);
        self.backend
            .get_object(bucket, object, range.as_deref())
            .await
    }

    /// Downloads an object into a local file.
    pub async fn fget_object(&self, bucket: &str, object: &str, file_path: &Path) -> Result<()> {
        let body = self.get_object(bucket, object).await?;
        tokio::fs::write(file_path, &body).await?;
        info!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            path = %file_path.display(),
            size = body.len(),
            "Object written to file"
        );
        Ok(())
    }

    /// Uploads an object from a byte buffer.
    pub async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        body: Bytes,
        metadata: Option<HashMap<String, String>>,
        content_length: Option<i64>,
    ) -> Result<PutResult> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        let size = body.len();
        let result = self
            .backend
            .put_object(PutObjectRequest {
                bucket: bucket.to_string(),
                key: object.to_string(),
                body,
                metadata,
                content_length,
            })
            .await?;
        info!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            size,
            "Object stored"
        );
        Ok(result)
    }

    /// Uploads an object from a local file.
    pub async fn fput_object(
        &self,
        bucket: &str,
        object: &str,
        file_path: &Path,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<PutResult> {
        let body = tokio::fs::read(file_path).await?;
        self.put_object(bucket, object, Bytes::from(body), metadata, None)
            .await
    }

    /// Server-side copies an object from `source` into `bucket/object`.
    ///
    /// `source` names the copy origin as `bucket/key`. When metadata is
    /// given it replaces the source object's metadata on the copy.
    pub async fn copy_object(
        &self,
        bucket: &str,
        object: &str,
        source: &str,
        conditions: CopyConditions,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<CopyResult> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;
        if source.is_empty() {
            return Err(Error::InvalidRequest(
                "copy source can not be empty".to_string(),
            ));
        }

        let result = self
            .backend
            .copy_object(CopyObjectRequest {
                bucket: bucket.to_string(),
                key: object.to_string(),
                source: source.to_string(),
                conditions,
                metadata,
            })
            .await?;
        info!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            source = %source,
            "Object copied"
        );
        Ok(result)
    }

    /// Fetches object metadata without the body.
    pub async fn stat_object(&self, bucket: &str, object: &str) -> Result<ObjectStat> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        self.backend.stat_object(bucket, object).await
    }

    /// Deletes one object.
    pub async fn remove_object(&self, bucket: &str, object: &str) -> Result<()> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        self.backend.delete_object(bucket, object).await?;
        info!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            "Object removed"
        );
        Ok(())
    }

    /// Deletes a batch of objects, returning the keys the backend deleted.
    pub async fn remove_objects(&self, bucket: &str, objects: Vec<String>) -> Result<Vec<String>> {
        validate_bucket_name(bucket)?;
        for object in &objects {
            validate_object_name(object)?;
        }

        let removed = self.backend.delete_objects(bucket, objects).await?;
        info!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            count = removed.len(),
            "Objects removed"
        );
        Ok(removed)
    }

    /// Aborts in-progress multipart uploads for an object key.
    ///
    /// Lists the pending uploads under the key and deletes their parts in
    /// one batch.
    pub async fn remove_incomplete_upload(&self, bucket: &str, object: &str) -> Result<()> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        let uploads = listing::list_uploads_all(
            self.backend.as_ref(),
            bucket,
            object,
            "",
            "",
            Some("/".to_string()),
        )
        .await?;
        if uploads.is_empty() {
            debug!(
                target: TRACING_TARGET_OBJECTS,
                bucket = %bucket,
                object = %object,
                "No incomplete uploads to remove"
            );
            return Ok(());
        }

        let keys = uploads.into_iter().map(|upload| upload.key).collect();
        let removed = self.backend.delete_objects(bucket, keys).await?;
        info!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            count = removed.len(),
            "Incomplete uploads removed"
        );
        Ok(())
    }

    /// Generates a presigned download URL.
    ///
    /// `request_params` may carry `response-*` header overrides; every
    /// recognized override must be a string, and unknown keys are ignored.
    /// Override validation happens before any backend call.
    pub async fn presigned_get_object(
        &self,
        bucket: &str,
        object: &str,
        expires: Option<Duration>,
        request_date: Option<OffsetDateTime>,
        request_params: Option<&Map<String, Value>>,
    ) -> Result<String> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        let response_headers = match request_params {
            Some(params) => ResponseHeaderOverrides::from_request_params(params)?,
            None => ResponseHeaderOverrides::default(),
        };

        let url = self
            .backend
            .presigned_get_url(PresignedGetRequest {
                bucket: bucket.to_string(),
                key: object.to_string(),
                expires: expires.unwrap_or(DEFAULT_PRESIGNED_EXPIRES),
                request_date,
                response_headers,
            })
            .await?;
        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            "Presigned download URL generated"
        );
        Ok(url)
    }

    /// Generates a presigned upload URL.
    pub async fn presigned_put_object(
        &self,
        bucket: &str,
        object: &str,
        expires: Option<Duration>,
    ) -> Result<String> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;

        let url = self
            .backend
            .presigned_put_url(PresignedPutRequest {
                bucket: bucket.to_string(),
                key: object.to_string(),
                expires: expires.unwrap_or(DEFAULT_PRESIGNED_EXPIRES),
            })
            .await?;
        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            object = %object,
            "Presigned upload URL generated"
        );
        Ok(url)
    }
}

impl fmt::Debug for S3Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Service")
            .field("endpoint", &self.config.endpoint_masked())
            .field("healthy", &self.is_healthy())
            .finish_non_exhaustive()
    }
}

/// Formats an HTTP byte-range header value from an offset and length.
///
/// A missing or zero length leaves the range open-ended; offset zero with
/// no effective length yields no range at all.
fn format_range(offset: u64, length: Option<u64>) -> Option<String> {
    let length = length.filter(|l| *l > 0);
    if offset == 0 && length.is_none() {
        return None;
    }
    match length {
        Some(length) => Some(format!("bytes={}-{}", offset, offset + length - 1)),
        None => Some(format!("bytes={}-", offset)),
    }
}
