//! Orphan reconciliation
//!
//! The upload-then-insert sequence is not atomic: an object can land in
//! durable storage while its metadata insert fails. Such orphans are
//! invisible to queries and harmless to correctness; a periodic sweep finds
//! them by comparing storage keys against recorded rows.

use crate::domain::entities::Artifact;
use crate::repository::{ArtifactStore, RetrievalError};
use std::collections::HashSet;
use std::sync::Arc;

/// Storage keys present in durable storage but absent from the metadata
/// rows. Pure set difference; ordering follows the storage listing.
pub fn find_orphans(storage_keys: &[String], recorded: &[Artifact]) -> Vec<String> {
    let known: HashSet<&str> = recorded.iter().map(|a| a.public_id.as_str()).collect();
    storage_keys
        .iter()
        .filter(|key| !known.contains(key.as_str()))
        .cloned()
        .collect()
}

/// Sweep one owner's storage listing against their recorded artifacts and
/// log what the sweep finds. Deletion of orphaned objects is a storage
/// lifecycle concern, not handled here.
pub async fn sweep_owner(
    store: Arc<dyn ArtifactStore>,
    owner_id: &str,
    storage_keys: &[String],
) -> Result<Vec<String>, RetrievalError> {
    let recorded = store.latest(owner_id, None, i64::MAX).await?;
    let orphans = find_orphans(storage_keys, &recorded);

    if orphans.is_empty() {
        tracing::debug!(owner_id, "No orphaned objects found");
    } else {
        tracing::warn!(
            owner_id,
            orphans = orphans.len(),
            "Found stored objects with no metadata row"
        );
    }

    Ok(orphans)
}
