//! Liveness probes for stored media URLs
//!
//! Storage lifecycle policies and non-atomic deletes mean a metadata row can
//! outlive its object. A probe is a status-only existence check: only the
//! response code is consulted, never the body.

use async_trait::async_trait;

/// Status-only existence check against a stored object's URL.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Whether the URL still resolves to a live object. Transport errors
    /// count as dead.
    async fn is_live(&self, url: &str) -> bool;
}

/// HEAD-request probe against the real storage CDN.
pub struct HttpProbe {
    http: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn is_live(&self, url: &str) -> bool {
        match self.http.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url, error = %e, "Liveness probe failed to send");
                false
            }
        }
    }
}
