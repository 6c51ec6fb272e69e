//! Durable object upload with bounded retry
//!
//! One durable object is created per successful call. The storage key is
//! computed once per logical upload and reused across retries, so a retry
//! after a half-applied attempt overwrites the same object instead of
//! creating a duplicate.

use crate::{StorageConfig, UploadError, UploadedObject, ValidatedMedia};
use reqwest::multipart::{Form, Part};

/// Deterministic storage key for one logical upload: `{owner}_{unix_millis}`.
///
/// Callers compute this once before the retry loop starts.
pub fn upload_key(owner_id: &str, timestamp_millis: i64) -> String {
    format!("{owner_id}_{timestamp_millis}")
}

/// Client for the storage upload endpoint.
pub struct StorageUploader {
    http: reqwest::Client,
    config: StorageConfig,
}

impl StorageUploader {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Upload validated media under a precomputed public id.
    ///
    /// Retries transient failures (non-2xx or transport error) up to the
    /// configured budget with a fixed delay; after exhaustion the last
    /// failure is classified and returned. The same `public_id` is sent on
    /// every attempt.
    pub async fn upload(
        &self,
        media: &ValidatedMedia,
        owner_id: &str,
        public_id: &str,
    ) -> Result<UploadedObject, UploadError> {
        let url = self.config.upload_url();
        let folder = format!("generated_interiors/{owner_id}/");
        let tags = format!("user_{owner_id},interior_design,generated");

        let mut last_error = UploadError::Unknown("Upload failed".to_string());

        for attempt in 1..=self.config.max_attempts {
            let form = self.build_form(media, public_id, &folder, &tags)?;

            match self.http.post(&url).multipart(form).send().await {
                Ok(response) if response.status().is_success() => {
                    let object = response
                        .json::<UploadedObject>()
                        .await
                        .map_err(|e| UploadError::Unknown(format!("Malformed upload response: {e}")))?;
                    tracing::debug!(
                        public_id = %object.public_id,
                        bytes = object.bytes,
                        attempt,
                        "Object uploaded to durable storage"
                    );
                    return Ok(object);
                }
                Ok(response) => {
                    let status = response.status();
                    let message = upload_error_message(response).await;
                    tracing::warn!(%status, attempt, "Upload attempt failed");
                    last_error = UploadError::classify(Some(status), &message);
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "Upload request failed to send");
                    last_error = UploadError::classify(None, &e.to_string());
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        Err(last_error)
    }

    fn build_form(
        &self,
        media: &ValidatedMedia,
        public_id: &str,
        folder: &str,
        tags: &str,
    ) -> Result<Form, UploadError> {
        let file = Part::bytes(media.bytes.clone())
            .file_name(format!("{public_id}.{}", media.format))
            .mime_str(&media.content_type())
            .map_err(|e| UploadError::Unknown(format!("Invalid content type: {e}")))?;

        Ok(Form::new()
            .part("file", file)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("cloud_name", self.config.cloud_name.clone())
            .text("public_id", public_id.to_string())
            .text("folder", folder.to_string())
            .text("tags", tags.to_string()))
    }
}

/// Pull a human-readable message out of an error response body.
async fn upload_error_message(response: reqwest::Response) -> String {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read response body".to_string());
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => value
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or(body),
        Err(_) => body,
    }
}
