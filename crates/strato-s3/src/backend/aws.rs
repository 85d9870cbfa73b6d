//! AWS S3 SDK implementation of the backend interface.
//!
//! Construction mirrors the service settings: the endpoint is either
//! resolved by the SDK (no endpoint configured), built from the
//! host/port/protocol triple, or taken verbatim as a URL string. Two SDK
//! clients are created, one for regular operations and one dedicated to
//! presigning, so concurrent presign calls never share request state with
//! in-flight operations.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::{ByteStream, DateTime};
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, MetadataDirective,
    ObjectIdentifier,
};
use bytes::Bytes;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info};

use super::{
    CopyObjectRequest, ListObjectsRequest, ListObjectsV2Request, ListUploadsRequest, ObjectPage,
    ObjectPageV2, ObjectStorage, PresignedGetRequest, PresignedPutRequest, PutObjectRequest,
    UploadPage,
};
use crate::client::S3Config;
use crate::types::{BucketEntry, CopyResult, ObjectEntry, ObjectStat, PutResult, UploadEntry};
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Fallback signing region when none is configured.
const DEFAULT_REGION: &str = "us-east-1";

/// AWS S3 SDK backend.
#[derive(Clone)]
pub struct AwsObjectStorage {
    client: Client,
    presigner: Client,
    config: Arc<S3Config>,
}

impl AwsObjectStorage {
    /// Creates a new backend from the connection configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration fails validation
    /// or the endpoint does not resolve to a valid URL.
    pub fn new(config: S3Config) -> Result<Self> {
        config.validate().map_err(|e| {
            error!(target: TRACING_TARGET_CLIENT, error = %e, "Configuration validation failed");
            e
        })?;

        let client = Self::build_client(&config)?;
        // Dedicated client for presigning; see module docs.
        let presigner = Self::build_client(&config)?;

        info!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %config.endpoint_masked(),
            access_key = %config.credentials().access_key_masked(),
            path_style = config.force_path_style,
            "S3 backend client initialized"
        );

        Ok(Self {
            client,
            presigner,
            config: Arc::new(config),
        })
    }

    fn build_client(config: &S3Config) -> Result<Client> {
        let credentials = Credentials::new(
            config.credentials().access_key(),
            config.credentials().secret_key(),
            config.credentials().session_token().map(str::to_string),
            None,
            "strato-s3",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style);

        if let Some(url) = config.endpoint_url()? {
            builder = builder.endpoint_url(url.to_string());
        }

        Ok(Client::from_conf(builder.build()))
    }

    /// Returns the connection configuration this backend was built from.
    #[inline]
    pub fn config(&self) -> &S3Config {
        &self.config
    }
}

impl std::fmt::Debug for AwsObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsObjectStorage")
            .field("endpoint", &self.config.endpoint_masked())
            .field("access_key", &self.config.credentials().access_key_masked())
            .field("path_style", &self.config.force_path_style)
            .finish()
    }
}

fn backend_error<E>(err: SdkError<E>) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status_code = err.raw_response().map(|response| response.status().as_u16());
    Error::Backend {
        message: DisplayErrorContext(&err).to_string(),
        status_code,
    }
}

fn to_offset_datetime(value: DateTime) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(value.secs()).ok()
}

fn to_aws_datetime(value: OffsetDateTime) -> DateTime {
    DateTime::from_secs(value.unix_timestamp())
}

fn object_to_entry(object: aws_sdk_s3::types::Object) -> Option<ObjectEntry> {
    let key = object.key?;
    let mut entry = ObjectEntry::new(key, object.size.unwrap_or(0).max(0) as u64);
    if let Some(last_modified) = object.last_modified.and_then(to_offset_datetime) {
        entry = entry.with_last_modified(last_modified);
    }
    if let Some(etag) = object.e_tag {
        entry = entry.with_etag(etag);
    }
    Some(entry)
}

fn upload_to_entry(upload: aws_sdk_s3::types::MultipartUpload) -> Option<UploadEntry> {
    let key = upload.key?;
    let upload_id = upload.upload_id?;
    let mut entry = UploadEntry::new(key, upload_id);
    if let Some(initiated) = upload.initiated.and_then(to_offset_datetime) {
        entry = entry.with_initiated(initiated);
    }
    Some(entry)
}

#[async_trait]
impl ObjectStorage for AwsObjectStorage {
    async fn create_bucket(&self, bucket: &str, region: Option<&str>) -> Result<Option<String>> {
        // An absent region maps to an empty location constraint.
        let constraint = BucketLocationConstraint::from(region.unwrap_or(""));
        let configuration = CreateBucketConfiguration::builder()
            .location_constraint(constraint)
            .build();

        let output = self
            .client
            .create_bucket()
            .bucket(bucket)
            .create_bucket_configuration(configuration)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(output.location)
    }

    async fn list_buckets(&self) -> Result<Vec<BucketEntry>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(backend_error)?;

        let buckets = output
            .buckets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|bucket| {
                let mut entry = BucketEntry::new(bucket.name?);
                if let Some(created) = bucket.creation_date.and_then(to_offset_datetime) {
                    entry = entry.with_creation_date(created);
                }
                Some(entry)
            })
            .collect();

        Ok(buckets)
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn list_objects_page(&self, request: ListObjectsRequest) -> Result<ObjectPage> {
        debug!(
            target: TRACING_TARGET_CLIENT,
            bucket = %request.bucket,
            marker = ?request.marker,
            "Fetching ListObjects page"
        );

        let output = self
            .client
            .list_objects()
            .bucket(request.bucket)
            .set_prefix(request.prefix)
            .set_delimiter(request.delimiter)
            .set_marker(request.marker)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(ObjectPage {
            entries: output
                .contents
                .unwrap_or_default()
                .into_iter()
                .filter_map(object_to_entry)
                .collect(),
            next_marker: output.next_marker,
            is_truncated: output.is_truncated.unwrap_or(false),
        })
    }

    async fn list_objects_v2_page(&self, request: ListObjectsV2Request) -> Result<ObjectPageV2> {
        debug!(
            target: TRACING_TARGET_CLIENT,
            bucket = %request.bucket,
            continuation_token = ?request.continuation_token,
            "Fetching ListObjectsV2 page"
        );

        let output = self
            .client
            .list_objects_v2()
            .bucket(request.bucket)
            .set_prefix(request.prefix)
            .set_delimiter(request.delimiter)
            .set_start_after(request.start_after)
            .set_continuation_token(request.continuation_token)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(ObjectPageV2 {
            entries: output
                .contents
                .unwrap_or_default()
                .into_iter()
                .filter_map(object_to_entry)
                .collect(),
            next_continuation_token: output.next_continuation_token,
        })
    }

    async fn list_uploads_page(&self, request: ListUploadsRequest) -> Result<UploadPage> {
        debug!(
            target: TRACING_TARGET_CLIENT,
            bucket = %request.bucket,
            key_marker = ?request.key_marker,
            upload_id_marker = ?request.upload_id_marker,
            "Fetching ListMultipartUploads page"
        );

        let output = self
            .client
            .list_multipart_uploads()
            .bucket(request.bucket)
            .set_prefix(request.prefix)
            .set_delimiter(request.delimiter)
            .set_key_marker(request.key_marker)
            .set_upload_id_marker(request.upload_id_marker)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(UploadPage {
            uploads: output
                .uploads
                .unwrap_or_default()
                .into_iter()
                .filter_map(upload_to_entry)
                .collect(),
            next_key_marker: output.next_key_marker,
            next_upload_id_marker: output.next_upload_id_marker,
            is_truncated: output.is_truncated.unwrap_or(false),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str, range: Option<&str>) -> Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_range(range.map(str::to_string))
            .send()
            .await
            .map_err(backend_error)?;

        let aggregated = output.body.collect().await.map_err(|e| Error::Backend {
            message: format!("Failed to read object body: {}", e),
            status_code: None,
        })?;

        Ok(aggregated.into_bytes())
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<PutResult> {
        let output = self
            .client
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .body(ByteStream::from(request.body))
            .set_metadata(request.metadata)
            .set_content_length(request.content_length)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(PutResult { etag: output.e_tag })
    }

    async fn copy_object(&self, request: CopyObjectRequest) -> Result<CopyResult> {
        let mut builder = self
            .client
            .copy_object()
            .bucket(request.bucket)
            .key(request.key)
            .copy_source(request.source)
            .set_copy_source_if_match(request.conditions.match_etag)
            .set_copy_source_if_none_match(request.conditions.match_etag_except)
            .set_copy_source_if_modified_since(request.conditions.modified.map(to_aws_datetime))
            .set_copy_source_if_unmodified_since(
                request.conditions.unmodified.map(to_aws_datetime),
            );

        if request.metadata.is_some() {
            // Replacement metadata is ignored by the backend unless the
            // directive says so.
            builder = builder
                .set_metadata(request.metadata)
                .metadata_directive(MetadataDirective::Replace);
        }

        let output = builder.send().await.map_err(backend_error)?;

        let mut result = CopyResult::default();
        if let Some(copy_result) = output.copy_object_result {
            if let Some(etag) = copy_result.e_tag {
                result = result.with_etag(etag);
            }
            if let Some(last_modified) = copy_result.last_modified.and_then(to_offset_datetime) {
                result = result.with_last_modified(last_modified);
            }
        }
        Ok(result)
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;

        let mut stat = ObjectStat::new(output.content_length.unwrap_or(0).max(0) as u64)
            .with_metadata(output.metadata.unwrap_or_default());
        if let Some(etag) = output.e_tag {
            stat = stat.with_etag(etag);
        }
        if let Some(last_modified) = output.last_modified.and_then(to_offset_datetime) {
            stat = stat.with_last_modified(last_modified);
        }
        if let Some(content_type) = output.content_type {
            stat = stat.with_content_type(content_type);
        }
        Ok(stat)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        let identifiers = keys
            .into_iter()
            .map(|key| {
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(|e| Error::InvalidRequest(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(|e| Error::InvalidRequest(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(output
            .deleted
            .unwrap_or_default()
            .into_iter()
            .filter_map(|deleted| deleted.key)
            .collect())
    }

    async fn presigned_get_url(&self, request: PresignedGetRequest) -> Result<String> {
        let headers = request.response_headers;

        let mut builder = self
            .presigner
            .get_object()
            .bucket(request.bucket)
            .key(request.key)
            .set_response_content_type(headers.content_type)
            .set_response_content_language(headers.content_language)
            .set_response_cache_control(headers.cache_control)
            .set_response_content_disposition(headers.content_disposition)
            .set_response_content_encoding(headers.content_encoding);

        if let Some(expires) = headers.expires {
            let instant = OffsetDateTime::parse(&expires, &Rfc3339).map_err(|e| {
                Error::InvalidRequest(format!(
                    "response-expires is not a valid RFC 3339 date: {}",
                    e
                ))
            })?;
            builder = builder.response_expires(to_aws_datetime(instant));
        }

        let mut presigning = PresigningConfig::builder().expires_in(request.expires);
        if let Some(request_date) = request.request_date {
            presigning = presigning.start_time(SystemTime::from(request_date));
        }
        let presigning = presigning
            .build()
            .map_err(|e| Error::InvalidRequest(e.to_string()))?;

        let presigned = builder
            .presigned(presigning)
            .await
            .map_err(backend_error)?;

        Ok(presigned.uri().to_string())
    }

    async fn presigned_put_url(&self, request: PresignedPutRequest) -> Result<String> {
        let presigning = PresigningConfig::builder()
            .expires_in(request.expires)
            .build()
            .map_err(|e| Error::InvalidRequest(e.to_string()))?;

        let presigned = self
            .presigner
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .presigned(presigning)
            .await
            .map_err(backend_error)?;

        Ok(presigned.uri().to_string())
    }
}
