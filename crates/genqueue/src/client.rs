//! HTTP client for the generation proxy
//!
//! The proxy exposes two endpoints: `POST /api/image-to-video` to enqueue a
//! job and `GET /api/task/{id}` to observe it. Error payloads are a flat
//! `{"error": "..."}` object.

use crate::{GenQueueConfig, GenQueueError, GenerationQueue, JobStatus, TaskSnapshot, VideoOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    prompt: &'a str,
    image_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "requestId")]
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    status: Option<String>,
    video: Option<VideoOutput>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client for the generation proxy API.
pub struct GenQueueClient {
    http: reqwest::Client,
    base_url: String,
}

impl GenQueueClient {
    pub fn new(config: &GenQueueConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Extract the upstream error message from a non-2xx response.
    async fn upstream_error(response: reqwest::Response) -> GenQueueError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("Generation service returned {status}"));
        GenQueueError::Upstream(message)
    }
}

#[async_trait]
impl GenerationQueue for GenQueueClient {
    async fn submit(&self, prompt: &str, image_url: &str) -> Result<String, GenQueueError> {
        let response = self
            .http
            .post(format!("{}/api/image-to-video", self.base_url))
            .json(&SubmitRequest { prompt, image_url })
            .send()
            .await
            .map_err(|e| GenQueueError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let submit = response
            .json::<SubmitResponse>()
            .await
            .map_err(|e| GenQueueError::Response(e.to_string()))?;

        tracing::debug!(request_id = %submit.request_id, "Generation job submitted");
        Ok(submit.request_id)
    }

    async fn poll(&self, request_id: &str) -> Result<TaskSnapshot, GenQueueError> {
        let response = self
            .http
            .get(format!("{}/api/task/{request_id}", self.base_url))
            .send()
            .await
            .map_err(|e| GenQueueError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let task = response
            .json::<TaskResponse>()
            .await
            .map_err(|e| GenQueueError::Response(e.to_string()))?;

        let status = task
            .status
            .as_deref()
            .map(JobStatus::from_remote)
            .unwrap_or(JobStatus::InProgress);

        Ok(TaskSnapshot {
            status,
            video: task.video,
            error: task.error,
        })
    }

    async fn fetch_result(&self, request_id: &str) -> Result<VideoOutput, GenQueueError> {
        let snapshot = self.poll(request_id).await?;
        match snapshot.video {
            Some(video) if !video.url.is_empty() => Ok(video),
            _ => Err(GenQueueError::MissingResult),
        }
    }
}
