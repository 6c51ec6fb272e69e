//! Generation pipeline
//!
//! Orchestrates the two user-facing flows:
//!
//! - approve: validate embedded media, upload it under a deterministic
//!   storage key, then record its metadata row. Upload and insert are two
//!   steps with no transaction across them; an insert failure leaves an
//!   orphaned object behind for the reconciliation sweep.
//! - create video: submit the approved image to the generation queue, poll
//!   the job to a terminal state, and record the finished video.

use atelier_artifacts::domain::entities::{Artifact, ArtifactKind, GalleryPage};
use atelier_artifacts::gallery::GalleryReconciler;
use atelier_artifacts::repository::ArtifactStore;
use atelier_common::{Error, Result};
use atelier_genqueue::{
    CancelToken, GenQueueConfig, GenQueueError, GenerationQueue, JobPoller, JobStatus,
};
use atelier_storage::probe::LivenessProbe;
use atelier_storage::{upload_key, validate, StorageUploader};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Prompt used when video creation is requested without one.
pub const DEFAULT_VIDEO_PROMPT: &str = "A documentary about the room as the camera slowly pans \
    across the room. Camera stays in the same place.";

/// Terminal result of one video creation flow. Non-completed terminal
/// states are outcomes, not errors: the caller decides how to present them.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCreation {
    pub request_id: String,
    pub status: JobStatus,
    pub artifact: Option<Artifact>,
    pub error_message: Option<String>,
}

pub struct GenerationPipeline {
    uploader: StorageUploader,
    queue: Arc<dyn GenerationQueue>,
    store: Arc<dyn ArtifactStore>,
    probe: Arc<dyn LivenessProbe>,
    poll_interval: Duration,
    max_polls: u32,
}

impl GenerationPipeline {
    pub fn new(
        uploader: StorageUploader,
        queue: Arc<dyn GenerationQueue>,
        store: Arc<dyn ArtifactStore>,
        probe: Arc<dyn LivenessProbe>,
        queue_config: &GenQueueConfig,
    ) -> Self {
        Self {
            uploader,
            queue,
            store,
            probe,
            poll_interval: queue_config.poll_interval,
            max_polls: queue_config.max_polls,
        }
    }

    /// Approve a rendered image: validate, upload, record.
    ///
    /// The storage key is computed once before the upload's retry loop so
    /// retries overwrite rather than duplicate.
    pub async fn approve_image(
        &self,
        owner_id: &str,
        input: &str,
        prompt: Option<String>,
        style: Option<String>,
    ) -> Result<Artifact> {
        let media = validate(input, None, None)?;
        let key = upload_key(owner_id, Utc::now().timestamp_millis());

        let object = self.uploader.upload(&media, owner_id, &key).await?;

        let artifact = Artifact::from_upload(owner_id, &object, prompt, style)?;
        match self.store.insert(&artifact).await {
            Ok(created) => {
                tracing::info!(
                    owner_id,
                    public_id = %created.public_id,
                    "Image approved and recorded"
                );
                Ok(created)
            }
            Err(e) => {
                // The uploaded object now has no metadata row; the orphan
                // sweep will find it
                tracing::warn!(
                    owner_id,
                    public_id = %object.public_id,
                    error = %e,
                    "Metadata insert failed after successful upload"
                );
                Err(e.into())
            }
        }
    }

    /// Turn an approved image into a generated video, polling the job to a
    /// terminal state.
    pub async fn create_video(
        &self,
        owner_id: &str,
        image_url: &str,
        prompt: Option<&str>,
        cancel: CancelToken,
    ) -> Result<VideoCreation> {
        let prompt = prompt.unwrap_or(DEFAULT_VIDEO_PROMPT);

        let request_id = self
            .queue
            .submit(prompt, image_url)
            .await
            .map_err(Error::from)?;
        tracing::info!(owner_id, %request_id, "Video generation job submitted");

        let poller = JobPoller::new(self.queue.clone(), self.poll_interval, self.max_polls);
        let outcome = match poller.run(&request_id, cancel).await {
            Ok(outcome) => outcome,
            // A job that completed without producing media counts as failed
            Err(GenQueueError::MissingResult) => {
                return Ok(VideoCreation {
                    request_id,
                    status: JobStatus::Failed,
                    artifact: None,
                    error_message: Some(GenQueueError::MissingResult.to_string()),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if outcome.status != JobStatus::Completed {
            tracing::warn!(
                owner_id,
                %request_id,
                status = %outcome.status,
                "Video generation did not complete"
            );
            return Ok(VideoCreation {
                request_id,
                status: outcome.status,
                artifact: None,
                error_message: outcome.error_message,
            });
        }

        let video = outcome
            .video
            .ok_or_else(|| Error::Internal("Completed job carried no video".to_string()))?;
        let artifact = Artifact::from_generation(
            owner_id,
            &video.url,
            video.public_id.as_deref().unwrap_or(&request_id),
            Some(prompt.to_string()),
        )?;

        match self.store.insert(&artifact).await {
            Ok(created) => Ok(VideoCreation {
                request_id,
                status: JobStatus::Completed,
                artifact: Some(created),
                error_message: None,
            }),
            Err(e) => {
                tracing::warn!(
                    owner_id,
                    %request_id,
                    url = %video.url,
                    error = %e,
                    "Metadata insert failed for generated video"
                );
                Err(e.into())
            }
        }
    }

    /// One page of the owner's gallery, dead links filtered out.
    pub async fn gallery(
        &self,
        owner_id: &str,
        kind: Option<ArtifactKind>,
        page: i64,
        page_size: i64,
    ) -> Result<GalleryPage> {
        let reconciler = GalleryReconciler::new(self.store.clone(), self.probe.clone());
        Ok(reconciler.page(owner_id, kind, page, page_size).await?)
    }

    /// Remove one of the owner's artifacts. Removing an already-removed
    /// artifact succeeds.
    pub async fn remove(&self, owner_id: &str, id: Uuid) -> Result<()> {
        self.store.delete(id, owner_id).await?;
        Ok(())
    }
}
