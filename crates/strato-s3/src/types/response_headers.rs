//! Response-header overrides for presigned GET URLs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// The `response-*` query parameters a presigned GET URL may override.
const VALID_RESPONSE_HEADERS: [&str; 6] = [
    "response-content-type",
    "response-content-language",
    "response-expires",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
];

/// Response-header overrides embedded in a presigned GET URL.
///
/// Built from a loosely-typed request-parameter map; every recognized key
/// must hold a string value, other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeaderOverrides {
    /// Overrides the `Content-Type` response header.
    pub content_type: Option<String>,
    /// Overrides the `Content-Language` response header.
    pub content_language: Option<String>,
    /// Overrides the `Expires` response header.
    pub expires: Option<String>,
    /// Overrides the `Cache-Control` response header.
    pub cache_control: Option<String>,
    /// Overrides the `Content-Disposition` response header.
    pub content_disposition: Option<String>,
    /// Overrides the `Content-Encoding` response header.
    pub content_encoding: Option<String>,
}

impl ResponseHeaderOverrides {
    /// Extracts the recognized overrides from a request-parameter map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when a recognized key holds a
    /// non-string value. Unrecognized keys are silently ignored.
    pub fn from_request_params(params: &Map<String, Value>) -> Result<Self> {
        // Precheck the value types before copying anything out.
        for key in VALID_RESPONSE_HEADERS {
            if let Some(value) = params.get(key) {
                if !value.is_string() {
                    return Err(Error::InvalidRequest(format!(
                        "response header {} should be of type \"string\"",
                        key
                    )));
                }
            }
        }

        let get = |key: &str| {
            params
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            content_type: get("response-content-type"),
            content_language: get("response-content-language"),
            expires: get("response-expires"),
            cache_control: get("response-cache-control"),
            content_disposition: get("response-content-disposition"),
            content_encoding: get("response-content-encoding"),
        })
    }

    /// Returns whether no override is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
