//! Mock generation queue for tests
//!
//! Plays back a scripted sequence of task snapshots and records every call,
//! so poller and pipeline tests run without a proxy.

use crate::{GenQueueError, GenerationQueue, TaskSnapshot, VideoOutput};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted queue: `poll` pops snapshots in order, repeating the last one
/// once the script is exhausted. An empty script reports a job that never
/// finishes.
#[derive(Clone)]
pub struct MockQueue {
    request_id: String,
    script: Arc<Mutex<VecDeque<TaskSnapshot>>>,
    result: Arc<Mutex<Option<VideoOutput>>>,
    submissions: Arc<Mutex<Vec<(String, String)>>>,
    poll_count: Arc<AtomicUsize>,
    submit_error: Arc<Mutex<Option<GenQueueError>>>,
}

impl MockQueue {
    pub fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            result: Arc::new(Mutex::new(None)),
            submissions: Arc::new(Mutex::new(Vec::new())),
            poll_count: Arc::new(AtomicUsize::new(0)),
            submit_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn push_snapshot(&self, snapshot: TaskSnapshot) {
        self.script
            .lock()
            .expect("script lock poisoned — prior test panicked")
            .push_back(snapshot);
    }

    pub fn set_result(&self, video: VideoOutput) {
        *self
            .result
            .lock()
            .expect("result lock poisoned — prior test panicked") = Some(video);
    }

    pub fn fail_submit(&self, error: GenQueueError) {
        *self
            .submit_error
            .lock()
            .expect("submit_error lock poisoned — prior test panicked") = Some(error);
    }

    /// `(prompt, image_url)` pairs submitted so far.
    pub fn submissions(&self) -> Vec<(String, String)> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned — prior test panicked")
            .clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationQueue for MockQueue {
    async fn submit(&self, prompt: &str, image_url: &str) -> Result<String, GenQueueError> {
        if let Some(err) = self
            .submit_error
            .lock()
            .expect("submit_error lock poisoned — prior test panicked")
            .take()
        {
            return Err(err);
        }
        self.submissions
            .lock()
            .expect("submissions lock poisoned — prior test panicked")
            .push((prompt.to_string(), image_url.to_string()));
        Ok(self.request_id.clone())
    }

    async fn poll(&self, _request_id: &str) -> Result<TaskSnapshot, GenQueueError> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        let mut script = self
            .script
            .lock()
            .expect("script lock poisoned — prior test panicked");
        match script.len() {
            0 => Ok(TaskSnapshot::in_progress()),
            1 => Ok(script.front().cloned().unwrap_or_else(TaskSnapshot::in_progress)),
            _ => Ok(script.pop_front().unwrap_or_else(TaskSnapshot::in_progress)),
        }
    }

    async fn fetch_result(&self, _request_id: &str) -> Result<VideoOutput, GenQueueError> {
        self.result
            .lock()
            .expect("result lock poisoned — prior test panicked")
            .clone()
            .ok_or(GenQueueError::MissingResult)
    }
}
