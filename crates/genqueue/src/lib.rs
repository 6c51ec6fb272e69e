//! Atelier Generation Queue
//!
//! Client-side view of the video generation proxy: submit a job, poll its
//! status, retrieve the finished artifact. The proxy owns the actual GPU
//! workers; this crate only tracks one job's lifecycle from the outside.

pub mod client;
pub mod mock;
pub mod poller;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use client::GenQueueClient;
pub use poller::{cancel_pair, CancelHandle, CancelToken, JobPoller, PollOutcome};

/// Errors from the generation queue boundary.
#[derive(Debug, Error, PartialEq)]
pub enum GenQueueError {
    #[error("Generation queue misconfigured: {0}")]
    Configuration(String),

    /// Transport-level failure before any upstream response arrived.
    #[error("Generation queue request failed: {0}")]
    Request(String),

    /// Upstream answered with an error payload.
    #[error("Generation service error: {0}")]
    Upstream(String),

    /// Upstream answered 2xx but the payload was not usable.
    #[error("Malformed generation queue response: {0}")]
    Response(String),

    /// A completed job carried no playable media URL.
    #[error("Completed job returned no result media")]
    MissingResult,
}

impl GenQueueError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GenQueueError::Configuration(_) => "CONFIGURATION_ERROR",
            GenQueueError::Request(_) => "NETWORK_FAILURE",
            GenQueueError::Upstream(_) => "EXTERNAL_SERVICE_ERROR",
            GenQueueError::Response(_) => "EXTERNAL_SERVICE_ERROR",
            GenQueueError::MissingResult => "MISSING_RESULT",
        }
    }
}

impl From<GenQueueError> for atelier_common::Error {
    fn from(e: GenQueueError) -> Self {
        atelier_common::Error::ExternalService(e.to_string())
    }
}

/// Lifecycle of one generation job as observed from this side of the queue.
///
/// `TimedOut` and `Canceled` are local verdicts: the upstream job may still
/// be running, but no further polls will be issued for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    TimedOut,
    Canceled,
}

impl JobStatus {
    /// Terminal states receive no further polls.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::TimedOut | JobStatus::Canceled
        )
    }

    /// States this status may legally move to.
    pub fn valid_transitions(&self) -> Vec<JobStatus> {
        match self {
            JobStatus::Pending => vec![
                JobStatus::InProgress,
                JobStatus::Completed,
                JobStatus::Failed,
                JobStatus::TimedOut,
                JobStatus::Canceled,
            ],
            JobStatus::InProgress => vec![
                JobStatus::Completed,
                JobStatus::Failed,
                JobStatus::TimedOut,
                JobStatus::Canceled,
            ],
            JobStatus::Completed | JobStatus::Failed | JobStatus::TimedOut | JobStatus::Canceled => {
                vec![]
            }
        }
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Map an upstream status string onto the local lifecycle. Unknown
    /// strings are treated as still running so polling continues.
    pub fn from_remote(status: &str) -> JobStatus {
        match status {
            "PENDING" | "IN_QUEUE" => JobStatus::Pending,
            "COMPLETED" | "SUCCEEDED" => JobStatus::Completed,
            "FAILED" | "ERROR" => JobStatus::Failed,
            _ => JobStatus::InProgress,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::TimedOut => "timed_out",
            JobStatus::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

/// Finished media produced by a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoOutput {
    pub url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

/// One observation of a job from the status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub status: JobStatus,
    pub video: Option<VideoOutput>,
    pub error: Option<String>,
}

impl TaskSnapshot {
    pub fn in_progress() -> Self {
        Self {
            status: JobStatus::InProgress,
            video: None,
            error: None,
        }
    }
}

/// Queue operations used by the poller and the generation pipeline.
#[async_trait]
pub trait GenerationQueue: Send + Sync {
    /// Enqueue one generation job. Returns the upstream request id.
    /// No retry at this layer: a duplicate submission would enqueue a
    /// duplicate job.
    async fn submit(&self, prompt: &str, image_url: &str) -> Result<String, GenQueueError>;

    /// One status poll for an in-flight job.
    async fn poll(&self, request_id: &str) -> Result<TaskSnapshot, GenQueueError>;

    /// Retrieve the finished media for a completed job.
    async fn fetch_result(&self, request_id: &str) -> Result<VideoOutput, GenQueueError>;
}

/// Queue client settings.
#[derive(Debug, Clone)]
pub struct GenQueueConfig {
    pub base_url: String,
    /// Fixed delay between status polls.
    pub poll_interval: Duration,
    /// Poll budget before a job is locally declared timed out.
    pub max_polls: u32,
}

impl GenQueueConfig {
    pub fn from_config(config: &atelier_common::Config) -> Self {
        Self {
            base_url: config.genqueue_base_url.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls,
        }
    }
}
