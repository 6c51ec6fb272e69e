//! In-memory artifact store for tests

use crate::domain::entities::{Artifact, ArtifactKind};
use crate::repository::{ArtifactQuery, ArtifactStore, RetrievalError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Store backed by a `Vec` behind a lock. Mirrors the Postgres store's
/// semantics: owner scoping, newest-first ordering, idempotent delete.
#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    rows: Arc<RwLock<Vec<Artifact>>>,
    fail_next_insert: Arc<AtomicBool>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert fail, for exercising the upload-then-insert
    /// failure path.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<Artifact> {
        self.rows
            .read()
            .expect("rows lock poisoned — prior test panicked")
            .clone()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn insert(&self, artifact: &Artifact) -> Result<Artifact, RetrievalError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(RetrievalError::Unknown("injected insert failure".to_string()));
        }
        self.rows
            .write()
            .expect("rows lock poisoned — prior test panicked")
            .push(artifact.clone());
        Ok(artifact.clone())
    }

    async fn query(&self, query: &ArtifactQuery) -> Result<(Vec<Artifact>, i64), RetrievalError> {
        query.validate()?;

        let rows = self
            .rows
            .read()
            .expect("rows lock poisoned — prior test panicked");
        let mut matching: Vec<Artifact> = rows
            .iter()
            .filter(|a| a.owner_id == query.owner_id)
            .filter(|a| query.kind.map_or(true, |k| a.kind == k))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page: Vec<Artifact> = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();

        Ok((page, total))
    }

    async fn latest(
        &self,
        owner_id: &str,
        kind: Option<ArtifactKind>,
        limit: i64,
    ) -> Result<Vec<Artifact>, RetrievalError> {
        let (page, _) = self
            .query(&ArtifactQuery {
                owner_id: owner_id.to_string(),
                kind,
                page: 1,
                page_size: limit,
            })
            .await?;
        Ok(page)
    }

    async fn delete(&self, id: Uuid, owner_id: &str) -> Result<(), RetrievalError> {
        self.rows
            .write()
            .expect("rows lock poisoned — prior test panicked")
            .retain(|a| !(a.id == id && a.owner_id == owner_id));
        Ok(())
    }
}
