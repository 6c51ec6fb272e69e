//! Atelier Artifacts Domain
//!
//! Owns the metadata record of every stored media object: persistence,
//! owner-scoped queries, gallery assembly with liveness filtering, and
//! reconciliation of rows whose backing object has gone missing.

pub mod domain;
pub mod gallery;
pub mod reconcile;
pub mod repository;

pub use domain::entities::{Artifact, ArtifactKind, GalleryPage};
pub use gallery::GalleryReconciler;
pub use repository::{ArtifactStore, RetrievalError};
