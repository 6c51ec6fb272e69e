//! Atelier Storage Service
//!
//! Client for the durable object store that backs approved artifacts:
//! - Pre-upload validation of embedded media (size and format caps)
//! - Multipart upload with a fixed retry budget and typed error classification
//! - Status-only liveness probes against stored media URLs
//! - Delivery URL transformations for resized/recompressed variants

pub mod delivery;
pub mod mock;
pub mod probe;
pub mod uploader;
pub mod validator;

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub use probe::{HttpProbe, LivenessProbe};
pub use uploader::{upload_key, StorageUploader};
pub use validator::{validate, ValidatedMedia, ValidationError};

/// Default base URL for the storage upload API.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com";

/// Upload failure classification, raised only after the retry budget is
/// exhausted. Selected from the HTTP status and message substrings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Network failure during upload")]
    NetworkFailure,

    #[error("Invalid storage credentials")]
    InvalidCredentials,

    #[error("Storage quota exceeded")]
    StorageQuotaExceeded,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Upload failed: {0}")]
    Unknown(String),
}

impl UploadError {
    /// Stable error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::NetworkFailure => "NETWORK_FAILURE",
            UploadError::InvalidCredentials => "INVALID_CREDENTIALS",
            UploadError::StorageQuotaExceeded => "STORAGE_QUOTA_EXCEEDED",
            UploadError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            UploadError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Classify an upload failure from the HTTP status and response message.
    ///
    /// `status` is `None` when the request never produced a response
    /// (transport-level failure).
    pub fn classify(status: Option<reqwest::StatusCode>, message: &str) -> Self {
        match status {
            Some(reqwest::StatusCode::UNAUTHORIZED) => UploadError::InvalidCredentials,
            Some(reqwest::StatusCode::TOO_MANY_REQUESTS) => UploadError::RateLimitExceeded,
            None => UploadError::NetworkFailure,
            Some(_) => {
                let lowered = message.to_lowercase();
                if lowered.contains("network") {
                    UploadError::NetworkFailure
                } else if lowered.contains("quota") {
                    UploadError::StorageQuotaExceeded
                } else {
                    UploadError::Unknown(message.to_string())
                }
            }
        }
    }
}

impl From<UploadError> for atelier_common::Error {
    fn from(err: UploadError) -> Self {
        atelier_common::Error::Upload(err.to_string())
    }
}

impl From<ValidationError> for atelier_common::Error {
    fn from(err: ValidationError) -> Self {
        atelier_common::Error::Validation(err.to_string())
    }
}

/// Storage service configuration. Account identifiers come from the
/// environment, never from compiled-in literals.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub base_url: String,
    /// Total upload attempts per logical upload (first try included)
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl StorageConfig {
    /// Build storage config from the shared application config.
    pub fn from_config(config: &atelier_common::Config) -> Self {
        Self {
            cloud_name: config.storage_cloud_name.clone(),
            upload_preset: config.storage_upload_preset.clone(),
            base_url: config
                .storage_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Upload endpoint for this account.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

/// Response fields returned by the storage upload endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadedObject {
    pub asset_id: String,
    pub public_id: String,
    pub url: String,
    pub secure_url: String,
    pub format: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub bytes: i64,
    pub resource_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_status() {
        assert_eq!(
            UploadError::classify(Some(reqwest::StatusCode::UNAUTHORIZED), "denied"),
            UploadError::InvalidCredentials
        );
        assert_eq!(
            UploadError::classify(Some(reqwest::StatusCode::TOO_MANY_REQUESTS), "slow down"),
            UploadError::RateLimitExceeded
        );
    }

    #[test]
    fn test_classify_transport_failure() {
        assert_eq!(UploadError::classify(None, "connection reset"), UploadError::NetworkFailure);
    }

    #[test]
    fn test_classify_by_message_substring() {
        assert_eq!(
            UploadError::classify(Some(reqwest::StatusCode::BAD_GATEWAY), "Network unreachable"),
            UploadError::NetworkFailure
        );
        assert_eq!(
            UploadError::classify(
                Some(reqwest::StatusCode::BAD_REQUEST),
                "storage quota exceeded for account"
            ),
            UploadError::StorageQuotaExceeded
        );
        assert_eq!(
            UploadError::classify(Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR), "boom"),
            UploadError::Unknown("boom".to_string())
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(UploadError::NetworkFailure.error_code(), "NETWORK_FAILURE");
        assert_eq!(
            UploadError::InvalidCredentials.error_code(),
            "INVALID_CREDENTIALS"
        );
        assert_eq!(
            UploadError::StorageQuotaExceeded.error_code(),
            "STORAGE_QUOTA_EXCEEDED"
        );
        assert_eq!(
            UploadError::RateLimitExceeded.error_code(),
            "RATE_LIMIT_EXCEEDED"
        );
        assert_eq!(
            UploadError::Unknown("x".to_string()).error_code(),
            "UNKNOWN_ERROR"
        );
    }

    #[test]
    fn test_upload_url() {
        let config = StorageConfig {
            cloud_name: "atelier".to_string(),
            upload_preset: "preset".to_string(),
            base_url: "https://api.example.com/".to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        };
        assert_eq!(
            config.upload_url(),
            "https://api.example.com/v1_1/atelier/image/upload"
        );
    }

    #[test]
    fn test_uploaded_object_deserialization() {
        let json = serde_json::json!({
            "asset_id": "a1",
            "public_id": "user-1_1700000000000",
            "url": "http://res.example.com/image/upload/v1/user-1_1700000000000.png",
            "secure_url": "https://res.example.com/image/upload/v1/user-1_1700000000000.png",
            "format": "png",
            "width": 1024,
            "height": 1536,
            "bytes": 2048,
            "resource_type": "image",
            "tags": ["user_user-1", "interior_design", "generated"]
        });
        let object: UploadedObject = serde_json::from_value(json).unwrap();
        assert_eq!(object.asset_id, "a1");
        assert_eq!(object.width, Some(1024));
        assert_eq!(object.tags.len(), 3);
    }
}
