//! Paginated listing loops.
//!
//! Each loop repeatedly fetches one page from the backend, carries the
//! continuation cursor from the previous response forward unmodified, and
//! accumulates entries in backend order. Pages are fetched strictly
//! sequentially; any page failure aborts the whole listing and discards
//! what was accumulated. Termination follows the cursor contract of the
//! listing variant in use: v1 and multipart-uploads listings stop when the
//! truncation flag clears, v2 stops when no continuation token is present
//! (token presence decides, not emptiness).

use tracing::{debug, info};

use crate::backend::{
    ListObjectsRequest, ListObjectsV2Request, ListUploadsRequest, ObjectStorage,
};
use crate::types::{ObjectEntry, UploadEntry, validate_bucket_name, validate_prefix};
use crate::{Result, TRACING_TARGET_OBJECTS};

/// Maps the recursive flag onto the listing delimiter: directory-style
/// listings group keys on `"/"`, recursive listings use no delimiter.
pub(crate) fn delimiter_for(recursive: bool) -> Option<String> {
    if recursive { None } else { Some("/".to_string()) }
}

/// Collects the complete ListObjects (v1) result for a bucket.
pub(crate) async fn list_objects_all(
    backend: &dyn ObjectStorage,
    bucket: &str,
    prefix: &str,
    recursive: bool,
) -> Result<Vec<ObjectEntry>> {
    validate_bucket_name(bucket)?;
    validate_prefix(prefix)?;

    let delimiter = delimiter_for(recursive);
    let mut entries = Vec::new();
    let mut marker: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = backend
            .list_objects_page(ListObjectsRequest {
                bucket: bucket.to_string(),
                prefix: Some(prefix.to_string()),
                delimiter: delimiter.clone(),
                marker,
            })
            .await?;

        pages += 1;
        let truncated = page.is_truncated;
        marker = page.next_marker;
        entries.extend(page.entries);

        if !truncated {
            break;
        }
    }

    info!(
        target: TRACING_TARGET_OBJECTS,
        bucket = %bucket,
        count = entries.len(),
        pages,
        "Objects listed"
    );

    Ok(entries)
}

/// Collects the complete ListObjects v2 result for a bucket.
pub(crate) async fn list_objects_v2_all(
    backend: &dyn ObjectStorage,
    bucket: &str,
    prefix: &str,
    recursive: bool,
    start_after: Option<&str>,
) -> Result<Vec<ObjectEntry>> {
    validate_bucket_name(bucket)?;
    validate_prefix(prefix)?;

    let delimiter = delimiter_for(recursive);
    let mut entries = Vec::new();
    let mut continuation_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = backend
            .list_objects_v2_page(ListObjectsV2Request {
                bucket: bucket.to_string(),
                prefix: Some(prefix.to_string()),
                delimiter: delimiter.clone(),
                start_after: start_after.map(str::to_string),
                continuation_token,
            })
            .await?;

        pages += 1;
        continuation_token = page.next_continuation_token;
        entries.extend(page.entries);

        if continuation_token.is_none() {
            break;
        }
    }

    info!(
        target: TRACING_TARGET_OBJECTS,
        bucket = %bucket,
        count = entries.len(),
        pages,
        "Objects listed (v2)"
    );

    Ok(entries)
}

/// Collects the complete in-progress multipart uploads listing.
///
/// The key marker and upload-id marker advance together, both taken from
/// the previous page's response.
pub(crate) async fn list_uploads_all(
    backend: &dyn ObjectStorage,
    bucket: &str,
    prefix: &str,
    key_marker: &str,
    upload_id_marker: &str,
    delimiter: Option<String>,
) -> Result<Vec<UploadEntry>> {
    validate_bucket_name(bucket)?;
    validate_prefix(prefix)?;

    let mut uploads = Vec::new();
    let mut key_marker: Option<String> = Some(key_marker.to_string());
    let mut upload_id_marker: Option<String> = Some(upload_id_marker.to_string());
    let mut pages = 0usize;

    loop {
        let page = backend
            .list_uploads_page(ListUploadsRequest {
                bucket: bucket.to_string(),
                prefix: Some(prefix.to_string()),
                delimiter: delimiter.clone(),
                key_marker,
                upload_id_marker,
            })
            .await?;

        pages += 1;
        let truncated = page.is_truncated;
        key_marker = page.next_key_marker;
        upload_id_marker = page.next_upload_id_marker;
        uploads.extend(page.uploads);

        if !truncated {
            break;
        }
    }

    debug!(
        target: TRACING_TARGET_OBJECTS,
        bucket = %bucket,
        count = uploads.len(),
        pages,
        "Incomplete uploads listed"
    );

    Ok(uploads)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::mock::MockStorage;
    use crate::Error;
    use crate::backend::{ObjectPage, ObjectPageV2, UploadPage};
    use crate::types::{ObjectEntry, UploadEntry};

    use super::*;

    fn object(key: &str) -> ObjectEntry {
        ObjectEntry::new(key, 1)
    }

    #[tokio::test]
    async fn v1_follows_markers_until_truncation_clears() {
        let mock = MockStorage::new().with_object_pages(vec![
            ObjectPage {
                entries: vec![object("a"), object("b")],
                next_marker: Some("b".into()),
                is_truncated: true,
            },
            ObjectPage {
                entries: vec![object("c")],
                next_marker: Some("c".into()),
                is_truncated: true,
            },
            ObjectPage {
                entries: vec![object("d")],
                next_marker: None,
                is_truncated: false,
            },
        ]);

        let entries = list_objects_all(&mock, "bucket", "", true).await.unwrap();
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c", "d"]);

        let requests = mock.list_objects_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].marker, None);
        assert_eq!(requests[1].marker, Some("b".into()));
        assert_eq!(requests[2].marker, Some("c".into()));
        // recursive listing carries no delimiter
        assert!(requests.iter().all(|r| r.delimiter.is_none()));
    }

    #[tokio::test]
    async fn v1_empty_bucket_yields_empty_after_one_request() {
        let mock = MockStorage::new().with_object_pages(vec![ObjectPage::default()]);

        let entries = list_objects_all(&mock, "bucket", "", false).await.unwrap();
        assert!(entries.is_empty());

        let requests = mock.list_objects_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].delimiter.as_deref(), Some("/"));
        assert_eq!(requests[0].prefix.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn v1_rejects_invalid_bucket_name_before_any_request() {
        let mock = MockStorage::new();

        let err = list_objects_all(&mock, "a..b", "", true).await.unwrap_err();
        assert!(matches!(err, Error::InvalidBucketName(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn v1_page_failure_aborts_whole_listing() {
        let mock = MockStorage::new()
            .with_object_pages(vec![ObjectPage {
                entries: vec![object("a")],
                next_marker: Some("a".into()),
                is_truncated: true,
            }])
            .with_page_error("page 2 unavailable");

        let err = list_objects_all(&mock, "bucket", "", true).await.unwrap_err();
        assert!(matches!(err, Error::Backend { .. }));
        assert_eq!(mock.list_objects_requests().len(), 2);
    }

    #[tokio::test]
    async fn v2_follows_continuation_tokens_exactly() {
        let mock = MockStorage::new().with_v2_pages(vec![
            ObjectPageV2 {
                entries: vec![object("a")],
                next_continuation_token: Some("t1".into()),
            },
            ObjectPageV2 {
                entries: vec![object("b")],
                next_continuation_token: None,
            },
        ]);

        let entries = list_objects_v2_all(&mock, "bucket", "logs/", true, Some("start"))
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);

        let requests = mock.list_objects_v2_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].continuation_token, None);
        assert_eq!(requests[1].continuation_token, Some("t1".into()));
        // start-after rides along on every page request
        assert!(
            requests
                .iter()
                .all(|r| r.start_after.as_deref() == Some("start"))
        );
    }

    #[tokio::test]
    async fn v2_empty_string_token_continues_the_loop() {
        // An empty continuation token means "empty string, not finished";
        // only token absence terminates.
        let mock = MockStorage::new().with_v2_pages(vec![
            ObjectPageV2 {
                entries: vec![object("a")],
                next_continuation_token: Some(String::new()),
            },
            ObjectPageV2 {
                entries: vec![object("b")],
                next_continuation_token: None,
            },
        ]);

        let entries = list_objects_v2_all(&mock, "bucket", "", true, None)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);

        let requests = mock.list_objects_v2_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].continuation_token, Some(String::new()));
    }

    #[tokio::test]
    async fn uploads_advance_both_markers_together() {
        let mock = MockStorage::new().with_upload_pages(vec![
            UploadPage {
                uploads: vec![UploadEntry::new("obj", "id-1")],
                next_key_marker: Some("obj".into()),
                next_upload_id_marker: Some("id-1".into()),
                is_truncated: true,
            },
            UploadPage {
                uploads: vec![UploadEntry::new("obj", "id-2")],
                next_key_marker: None,
                next_upload_id_marker: None,
                is_truncated: false,
            },
        ]);

        let uploads = list_uploads_all(&mock, "bucket", "obj", "", "", Some("/".into()))
            .await
            .unwrap();
        assert_eq!(uploads.len(), 2);

        let requests = mock.list_uploads_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].key_marker, Some(String::new()));
        assert_eq!(requests[0].upload_id_marker, Some(String::new()));
        assert_eq!(requests[1].key_marker, Some("obj".into()));
        assert_eq!(requests[1].upload_id_marker, Some("id-1".into()));
    }

    #[tokio::test]
    async fn uploads_validate_prefix_length() {
        let mock = MockStorage::new();
        let long_prefix = "p".repeat(1025);

        let err = list_uploads_all(&mock, "bucket", &long_prefix, "", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn listers_work_through_trait_objects() {
        let mock: Arc<dyn ObjectStorage> =
            Arc::new(MockStorage::new().with_object_pages(vec![ObjectPage::default()]));
        let entries = list_objects_all(mock.as_ref(), "bucket", "", false)
            .await
            .unwrap();
        assert!(entries.is_empty());
    }
}
