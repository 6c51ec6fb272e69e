//! Mock liveness probe for gallery tests
//!
//! Records every probed URL and the peak number of concurrently outstanding
//! probes so callers can assert batch-width behavior.

use crate::probe::LivenessProbe;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Programmable probe: every URL is live unless marked dead.
#[derive(Clone)]
pub struct MockProbe {
    dead: Arc<Mutex<HashSet<String>>>,
    probed: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Duration,
}

impl MockProbe {
    pub fn new() -> Self {
        Self {
            dead: Arc::new(Mutex::new(HashSet::new())),
            probed: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            delay: Duration::from_millis(5),
        }
    }

    /// Mark a URL as dead: probes against it report the object gone.
    pub fn mark_dead(&self, url: &str) {
        self.dead
            .lock()
            .expect("dead lock poisoned — prior test panicked")
            .insert(url.to_string());
    }

    /// All URLs probed so far, in completion order.
    pub fn probed_urls(&self) -> Vec<String> {
        self.probed
            .lock()
            .expect("probed lock poisoned — prior test panicked")
            .clone()
    }

    /// Peak number of probes outstanding at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LivenessProbe for MockProbe {
    async fn is_live(&self, url: &str) -> bool {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        // Yield so sibling probes in the same batch overlap
        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.probed
            .lock()
            .expect("probed lock poisoned — prior test panicked")
            .push(url.to_string());

        !self
            .dead
            .lock()
            .expect("dead lock poisoned — prior test panicked")
            .contains(url)
    }
}
