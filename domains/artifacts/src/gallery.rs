//! Gallery assembly with liveness filtering
//!
//! A gallery page is the stored metadata page with dead links removed:
//! every candidate URL is probed, and rows whose object is gone are dropped
//! from the response without surfacing an error. Pagination counts are
//! computed from the stored rows before filtering, so a page may come back
//! shorter than `page_size` even when later pages exist.

use crate::domain::entities::{total_pages, Artifact, ArtifactKind, GalleryPage};
use crate::repository::{ArtifactQuery, ArtifactStore, RetrievalError};
use atelier_storage::probe::LivenessProbe;
use futures::future::join_all;
use std::sync::Arc;

/// Probes issued concurrently per batch.
const PROBE_BATCH_SIZE: usize = 5;

pub struct GalleryReconciler {
    store: Arc<dyn ArtifactStore>,
    probe: Arc<dyn LivenessProbe>,
}

impl GalleryReconciler {
    pub fn new(store: Arc<dyn ArtifactStore>, probe: Arc<dyn LivenessProbe>) -> Self {
        Self { store, probe }
    }

    /// One gallery page for an owner, with dead links filtered out.
    pub async fn page(
        &self,
        owner_id: &str,
        kind: Option<ArtifactKind>,
        page: i64,
        page_size: i64,
    ) -> Result<GalleryPage, RetrievalError> {
        let query = ArtifactQuery {
            owner_id: owner_id.to_string(),
            kind,
            page,
            page_size,
        };
        let (candidates, total_items) = self.store.query(&query).await?;
        let live = self.filter_live(candidates).await;

        tracing::debug!(
            owner_id,
            page,
            total_items,
            live = live.len(),
            "Assembled gallery page"
        );

        Ok(GalleryPage {
            items: live,
            page,
            page_size,
            total_items,
            total_pages: total_pages(total_items, page_size),
        })
    }

    /// Probe candidates in fixed-width batches, keeping only rows whose
    /// object still resolves. Order within the page is preserved.
    async fn filter_live(&self, candidates: Vec<Artifact>) -> Vec<Artifact> {
        let mut live = Vec::with_capacity(candidates.len());

        for batch in candidates.chunks(PROBE_BATCH_SIZE) {
            let probes = batch.iter().map(|a| self.probe.is_live(&a.secure_url));
            let verdicts = join_all(probes).await;

            for (artifact, is_live) in batch.iter().zip(verdicts) {
                if is_live {
                    live.push(artifact.clone());
                } else {
                    tracing::debug!(
                        public_id = %artifact.public_id,
                        "Dropping dead link from gallery"
                    );
                }
            }
        }

        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryArtifactStore;
    use atelier_storage::mock::MockProbe;
    use atelier_storage::UploadedObject;
    use chrono::{Duration, Utc};

    fn artifact(owner: &str, public_id: &str, age_secs: i64) -> Artifact {
        let mut artifact = Artifact::from_upload(
            owner,
            &UploadedObject {
                asset_id: format!("asset-{public_id}"),
                public_id: public_id.to_string(),
                url: format!("http://res.test/image/upload/{public_id}.png"),
                secure_url: format!("https://res.test/image/upload/{public_id}.png"),
                format: "png".to_string(),
                width: Some(512),
                height: Some(512),
                bytes: 1024,
                resource_type: "image".to_string(),
                tags: vec![],
            },
            None,
            None,
        )
        .unwrap();
        artifact.created_at = Utc::now() - Duration::seconds(age_secs);
        artifact
    }

    async fn seeded_store(count: i64) -> InMemoryArtifactStore {
        let store = InMemoryArtifactStore::new();
        for i in 0..count {
            store
                .insert(&artifact("u1", &format!("u1_{i}"), i))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_dead_links_are_dropped_silently() {
        let store = seeded_store(12).await;
        let probe = MockProbe::new();
        probe.mark_dead("https://res.test/image/upload/u1_3.png");
        probe.mark_dead("https://res.test/image/upload/u1_7.png");
        probe.mark_dead("https://res.test/image/upload/u1_9.png");

        let reconciler = GalleryReconciler::new(Arc::new(store), Arc::new(probe));
        let page = reconciler.page("u1", None, 1, 12).await.unwrap();

        assert_eq!(page.items.len(), 9);
        assert!(page
            .items
            .iter()
            .all(|a| !a.public_id.ends_with("_3")
                && !a.public_id.ends_with("_7")
                && !a.public_id.ends_with("_9")));
    }

    #[tokio::test]
    async fn test_pagination_counts_reflect_stored_rows_not_live_ones() {
        let store = seeded_store(25).await;
        let probe = MockProbe::new();
        probe.mark_dead("https://res.test/image/upload/u1_1.png");

        let reconciler = GalleryReconciler::new(Arc::new(store), Arc::new(probe));
        let page = reconciler.page("u1", None, 1, 12).await.unwrap();

        // Counts come from the database, before liveness filtering
        assert_eq!(page.total_items, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 11);
    }

    #[tokio::test]
    async fn test_probes_run_in_batches_of_five() {
        let store = seeded_store(12).await;
        let probe = MockProbe::new();

        let reconciler = GalleryReconciler::new(Arc::new(store), Arc::new(probe.clone()));
        let page = reconciler.page("u1", None, 1, 12).await.unwrap();

        assert_eq!(page.items.len(), 12);
        assert_eq!(probe.probed_urls().len(), 12);
        assert!(probe.max_in_flight() <= PROBE_BATCH_SIZE);
        // A full batch actually overlaps
        assert!(probe.max_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_page_order_is_preserved() {
        let store = seeded_store(8).await;
        let probe = MockProbe::new();

        let reconciler = GalleryReconciler::new(Arc::new(store), Arc::new(probe));
        let page = reconciler.page("u1", None, 1, 12).await.unwrap();

        let ids: Vec<&str> = page.items.iter().map(|a| a.public_id.as_str()).collect();
        let expected: Vec<String> = (0..8).map(|i| format!("u1_{i}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_gallery() {
        let store = InMemoryArtifactStore::new();
        let probe = MockProbe::new();

        let reconciler = GalleryReconciler::new(Arc::new(store), Arc::new(probe.clone()));
        let page = reconciler.page("u1", None, 1, 12).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert!(probe.probed_urls().is_empty());
    }
}
