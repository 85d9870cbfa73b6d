//! Scripted backend for service tests.
//!
//! Records every request it receives and replays preconfigured pages and
//! results, so tests can assert on exact request sequences and cursor
//! values without a live backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::backend::{
    CopyObjectRequest, ListObjectsRequest, ListObjectsV2Request, ListUploadsRequest, ObjectPage,
    ObjectPageV2, ObjectStorage, PresignedGetRequest, PresignedPutRequest, PutObjectRequest,
    UploadPage,
};
use crate::types::{BucketEntry, CopyResult, ObjectStat, PutResult};
use crate::{Error, Result};

/// One recorded backend request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MockCall {
    CreateBucket {
        bucket: String,
        region: Option<String>,
    },
    ListBuckets,
    DeleteBucket {
        bucket: String,
    },
    ListObjects(ListObjectsRequest),
    ListObjectsV2(ListObjectsV2Request),
    ListUploads(ListUploadsRequest),
    GetObject {
        bucket: String,
        key: String,
        range: Option<String>,
    },
    PutObject(PutObjectRequest),
    CopyObject(CopyObjectRequest),
    StatObject {
        bucket: String,
        key: String,
    },
    DeleteObject {
        bucket: String,
        key: String,
    },
    DeleteObjects {
        bucket: String,
        keys: Vec<String>,
    },
    PresignedGet(PresignedGetRequest),
    PresignedPut(PresignedPutRequest),
}

/// Scripted [`ObjectStorage`] implementation.
#[derive(Debug, Default)]
pub(crate) struct MockStorage {
    calls: Mutex<Vec<MockCall>>,
    object_pages: Mutex<VecDeque<ObjectPage>>,
    v2_pages: Mutex<VecDeque<ObjectPageV2>>,
    upload_pages: Mutex<VecDeque<UploadPage>>,
    /// Returned once the scripted pages run out; otherwise empty terminal
    /// pages are served.
    page_error: Option<String>,
    buckets: Vec<BucketEntry>,
    list_buckets_error: Option<String>,
    /// When set, list-buckets never resolves (for probe timeout tests).
    hang_list_buckets: bool,
    /// Error status returned by delete-bucket.
    delete_bucket_status: Option<u16>,
    create_bucket_location: Option<String>,
    object_body: Bytes,
    stat: ObjectStat,
}

impl MockStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_object_pages(self, pages: Vec<ObjectPage>) -> Self {
        *self.object_pages.lock().unwrap() = pages.into();
        self
    }

    pub(crate) fn with_v2_pages(self, pages: Vec<ObjectPageV2>) -> Self {
        *self.v2_pages.lock().unwrap() = pages.into();
        self
    }

    pub(crate) fn with_upload_pages(self, pages: Vec<UploadPage>) -> Self {
        *self.upload_pages.lock().unwrap() = pages.into();
        self
    }

    pub(crate) fn with_page_error(mut self, message: impl Into<String>) -> Self {
        self.page_error = Some(message.into());
        self
    }

    pub(crate) fn with_buckets(mut self, buckets: Vec<BucketEntry>) -> Self {
        self.buckets = buckets;
        self
    }

    pub(crate) fn with_list_buckets_error(mut self, message: impl Into<String>) -> Self {
        self.list_buckets_error = Some(message.into());
        self
    }

    pub(crate) fn with_hanging_list_buckets(mut self) -> Self {
        self.hang_list_buckets = true;
        self
    }

    pub(crate) fn with_delete_bucket_status(mut self, status: u16) -> Self {
        self.delete_bucket_status = Some(status);
        self
    }

    pub(crate) fn with_create_bucket_location(mut self, location: impl Into<String>) -> Self {
        self.create_bucket_location = Some(location.into());
        self
    }

    pub(crate) fn with_object_body(mut self, body: Bytes) -> Self {
        self.object_body = body;
        self
    }

    pub(crate) fn with_stat(mut self, stat: ObjectStat) -> Self {
        self.stat = stat;
        self
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn list_objects_requests(&self) -> Vec<ListObjectsRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ListObjects(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn list_objects_v2_requests(&self) -> Vec<ListObjectsV2Request> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ListObjectsV2(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn list_uploads_requests(&self) -> Vec<ListUploadsRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ListUploads(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn exhausted_page_result<T: Default>(&self) -> Result<T> {
        match &self.page_error {
            Some(message) => Err(Error::Backend {
                message: message.clone(),
                status_code: Some(503),
            }),
            None => Ok(T::default()),
        }
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn create_bucket(&self, bucket: &str, region: Option<&str>) -> Result<Option<String>> {
        self.record(MockCall::CreateBucket {
            bucket: bucket.to_string(),
            region: region.map(str::to_string),
        });
        Ok(self.create_bucket_location.clone())
    }

    async fn list_buckets(&self) -> Result<Vec<BucketEntry>> {
        self.record(MockCall::ListBuckets);
        if self.hang_list_buckets {
            futures::future::pending::<()>().await;
        }
        if let Some(message) = &self.list_buckets_error {
            return Err(Error::Backend {
                message: message.clone(),
                status_code: Some(500),
            });
        }
        Ok(self.buckets.clone())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.record(MockCall::DeleteBucket {
            bucket: bucket.to_string(),
        });
        match self.delete_bucket_status {
            Some(status) => Err(Error::Backend {
                message: format!("delete bucket failed with status {}", status),
                status_code: Some(status),
            }),
            None => Ok(()),
        }
    }

    async fn list_objects_page(&self, request: ListObjectsRequest) -> Result<ObjectPage> {
        self.record(MockCall::ListObjects(request));
        match self.object_pages.lock().unwrap().pop_front() {
            Some(page) => Ok(page),
            None => self.exhausted_page_result(),
        }
    }

    async fn list_objects_v2_page(&self, request: ListObjectsV2Request) -> Result<ObjectPageV2> {
        self.record(MockCall::ListObjectsV2(request));
        match self.v2_pages.lock().unwrap().pop_front() {
            Some(page) => Ok(page),
            None => self.exhausted_page_result(),
        }
    }

    async fn list_uploads_page(&self, request: ListUploadsRequest) -> Result<UploadPage> {
        self.record(MockCall::ListUploads(request));
        match self.upload_pages.lock().unwrap().pop_front() {
            Some(page) => Ok(page),
            None => self.exhausted_page_result(),
        }
    }

    async fn get_object(&self, bucket: &str, key: &str, range: Option<&str>) -> Result<Bytes> {
        self.record(MockCall::GetObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            range: range.map(str::to_string),
        });
        Ok(self.object_body.clone())
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<PutResult> {
        self.record(MockCall::PutObject(request));
        Ok(PutResult::new("mock-etag"))
    }

    async fn copy_object(&self, request: CopyObjectRequest) -> Result<CopyResult> {
        self.record(MockCall::CopyObject(request));
        Ok(CopyResult::default().with_etag("mock-copy-etag"))
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        self.record(MockCall::StatObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        Ok(self.stat.clone())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.record(MockCall::DeleteObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        self.record(MockCall::DeleteObjects {
            bucket: bucket.to_string(),
            keys: keys.clone(),
        });
        Ok(keys)
    }

    async fn presigned_get_url(&self, request: PresignedGetRequest) -> Result<String> {
        let url = format!("https://signed.example/{}/{}", request.bucket, request.key);
        self.record(MockCall::PresignedGet(request));
        Ok(url)
    }

    async fn presigned_put_url(&self, request: PresignedPutRequest) -> Result<String> {
        let url = format!("https://signed.example/{}/{}", request.bucket, request.key);
        self.record(MockCall::PresignedPut(request));
        Ok(url)
    }
}
