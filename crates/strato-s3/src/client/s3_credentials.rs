//! Backend authentication credentials.

use serde::{Deserialize, Serialize};

/// Authentication credentials for the object-storage backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Credentials {
    /// Access key for backend authentication.
    #[serde(rename = "accessKey")]
    pub access_key: String,

    /// Secret key for backend authentication.
    /// Never serialized; masked in debug output.
    #[serde(rename = "secretKey", skip_serializing)]
    pub secret_key: String,

    /// Optional session token for temporary credentials
    /// (sent as `x-amz-security-token`).
    #[serde(rename = "sessionToken")]
    pub session_token: Option<String>,
}

impl S3Credentials {
    /// Creates new credentials with access key and secret key.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
        }
    }

    /// Creates new credentials with access key, secret key, and session token.
    pub fn with_session_token(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: Some(session_token.into()),
        }
    }

    /// Returns the access key.
    #[inline]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Returns the secret key.
    #[inline]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Returns the session token if available.
    #[inline]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Returns a masked version of the access key for logging.
    ///
    /// Shows only the first 4 characters followed by asterisks.
    pub fn access_key_masked(&self) -> String {
        if self.access_key.len() <= 4 {
            "*".repeat(self.access_key.len())
        } else {
            format!("{}***", &self.access_key[..4])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_new() {
        let creds = S3Credentials::new("access", "secret");
        assert_eq!(creds.access_key(), "access");
        assert_eq!(creds.secret_key(), "secret");
        assert!(creds.session_token().is_none());
    }

    #[test]
    fn credentials_with_session_token() {
        let creds = S3Credentials::with_session_token("access", "secret", "token");
        assert_eq!(creds.session_token(), Some("token"));
    }

    #[test]
    fn credentials_masking() {
        let creds = S3Credentials::new("AKIATEST12345", "secret");
        assert_eq!(creds.access_key_masked(), "AKIA***");

        let short_creds = S3Credentials::new("ABC", "secret");
        assert_eq!(short_creds.access_key_masked(), "***");
    }

    #[test]
    fn secret_key_never_serialized() {
        let creds = S3Credentials::new("access", "secret");
        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("accessKey"));
    }
}
