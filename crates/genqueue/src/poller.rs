//! Job status polling loop
//!
//! Drives one job from submission to a terminal state: one status request
//! per tick at a fixed interval, with a poll budget and a cooperative cancel
//! signal. Progress is synthetic — the proxy reports none — and is published
//! on a watch channel so observers can sample it at their own pace.

use crate::{GenQueueError, GenerationQueue, JobStatus, TaskSnapshot, VideoOutput};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Progress shown once the job is accepted, before the first poll.
const PROGRESS_AFTER_SUBMIT: u8 = 10;
/// Progress added per completed poll.
const PROGRESS_STEP: u8 = 10;
/// Synthetic progress never claims completion; only a terminal poll does.
const PROGRESS_CAP: u8 = 95;

const DEFAULT_FAILURE_MESSAGE: &str = "Video generation failed.";
const TIMEOUT_MESSAGE: &str = "Video generation timed out.";

/// Sender half of the cancel signal.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Request cancellation. Observed at the next loop iteration; in-flight
    /// status requests are not aborted.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiver half of the cancel signal, checked once per loop iteration.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_canceled(&self) -> bool {
        *self.rx.borrow()
    }

    /// A token that never fires, for callers without a cancel path.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelToken { rx })
}

/// Terminal verdict for one polled job.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub status: JobStatus,
    pub video: Option<VideoOutput>,
    pub error_message: Option<String>,
}

/// Polls one job to completion.
pub struct JobPoller {
    queue: Arc<dyn GenerationQueue>,
    interval: Duration,
    max_polls: u32,
    progress_tx: watch::Sender<u8>,
}

impl JobPoller {
    pub fn new(queue: Arc<dyn GenerationQueue>, interval: Duration, max_polls: u32) -> Self {
        let (progress_tx, _) = watch::channel(PROGRESS_AFTER_SUBMIT);
        Self {
            queue,
            interval,
            max_polls,
            progress_tx,
        }
    }

    /// Subscribe to synthetic progress updates for this poller's job.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress_tx.subscribe()
    }

    /// Poll until the job reaches a terminal state, the poll budget runs
    /// out, or the cancel signal fires. Queue errors abort the loop.
    pub async fn run(
        &self,
        request_id: &str,
        cancel: CancelToken,
    ) -> Result<PollOutcome, GenQueueError> {
        let mut progress = PROGRESS_AFTER_SUBMIT;
        let _ = self.progress_tx.send(progress);

        for poll in 1..=self.max_polls {
            if cancel.is_canceled() {
                tracing::debug!(request_id, poll, "Polling canceled");
                return Ok(PollOutcome {
                    status: JobStatus::Canceled,
                    video: None,
                    error_message: None,
                });
            }

            tokio::time::sleep(self.interval).await;

            let snapshot = self.queue.poll(request_id).await?;
            progress = (progress + PROGRESS_STEP).min(PROGRESS_CAP);
            let _ = self.progress_tx.send(progress);

            tracing::debug!(request_id, poll, status = %snapshot.status, "Polled job status");

            match snapshot.status {
                JobStatus::Completed => {
                    let video = self.resolve_video(request_id, snapshot).await?;
                    let _ = self.progress_tx.send(100);
                    return Ok(PollOutcome {
                        status: JobStatus::Completed,
                        video: Some(video),
                        error_message: None,
                    });
                }
                JobStatus::Failed => {
                    let _ = self.progress_tx.send(100);
                    return Ok(PollOutcome {
                        status: JobStatus::Failed,
                        video: None,
                        error_message: Some(
                            snapshot
                                .error
                                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
                        ),
                    });
                }
                JobStatus::Pending | JobStatus::InProgress => continue,
                // Local verdicts never arrive from the wire
                JobStatus::TimedOut | JobStatus::Canceled => continue,
            }
        }

        tracing::warn!(request_id, max_polls = self.max_polls, "Poll budget exhausted");
        Ok(PollOutcome {
            status: JobStatus::TimedOut,
            video: None,
            error_message: Some(TIMEOUT_MESSAGE.to_string()),
        })
    }

    /// A completed snapshot usually embeds the video; fall back to a result
    /// fetch when it does not.
    async fn resolve_video(
        &self,
        request_id: &str,
        snapshot: TaskSnapshot,
    ) -> Result<VideoOutput, GenQueueError> {
        match snapshot.video {
            Some(video) if !video.url.is_empty() => Ok(video),
            _ => self.queue.fetch_result(request_id).await,
        }
    }
}
