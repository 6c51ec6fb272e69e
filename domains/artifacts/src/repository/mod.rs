//! Artifact persistence
//!
//! `ArtifactStore` is the seam between the domain and the database: the
//! Postgres implementation serves production, the in-memory one serves
//! tests. Every operation is owner-scoped; no query can cross owners.

pub mod memory;
pub mod postgres;

use crate::domain::entities::{Artifact, ArtifactKind};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryArtifactStore;
pub use postgres::PgArtifactStore;

/// Errors from artifact metadata reads and writes.
#[derive(Debug, Error, PartialEq)]
pub enum RetrievalError {
    #[error("Invalid query parameters: {0}")]
    InvalidParameters(String),

    #[error("Requested resource does not exist: {0}")]
    ResourceNotFound(String),

    #[error("Database authentication failed")]
    AuthenticationFailure,

    #[error("Database query timed out")]
    ApiTimeout,

    #[error("Artifact store error: {0}")]
    Unknown(String),
}

impl RetrievalError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RetrievalError::InvalidParameters(_) => "INVALID_PARAMETERS",
            RetrievalError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            RetrievalError::AuthenticationFailure => "AUTHENTICATION_FAILURE",
            RetrievalError::ApiTimeout => "API_TIMEOUT",
            RetrievalError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Classify a database error by its SQLSTATE code.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        let code = match &e {
            sqlx::Error::Database(db) => db.code().map(|c| c.to_string()),
            _ => None,
        };
        match code.as_deref() {
            Some("42P01") => RetrievalError::ResourceNotFound("relation missing".to_string()),
            Some("28P01") => RetrievalError::AuthenticationFailure,
            Some("57014") => RetrievalError::ApiTimeout,
            _ => RetrievalError::Unknown(e.to_string()),
        }
    }
}

impl From<RetrievalError> for atelier_common::Error {
    fn from(e: RetrievalError) -> Self {
        match e {
            RetrievalError::InvalidParameters(msg) => atelier_common::Error::Validation(msg),
            other => atelier_common::Error::Retrieval(other.to_string()),
        }
    }
}

/// Query over one owner's artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactQuery {
    pub owner_id: String,
    pub kind: Option<ArtifactKind>,
    /// 1-based page number.
    pub page: i64,
    pub page_size: i64,
}

impl ArtifactQuery {
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.owner_id.trim().is_empty() {
            return Err(RetrievalError::InvalidParameters(
                "owner_id must not be empty".to_string(),
            ));
        }
        if self.page < 1 {
            return Err(RetrievalError::InvalidParameters(
                "page must be >= 1".to_string(),
            ));
        }
        if self.page_size < 1 {
            return Err(RetrievalError::InvalidParameters(
                "page_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Owner-scoped artifact metadata store.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist one artifact row.
    async fn insert(&self, artifact: &Artifact) -> Result<Artifact, RetrievalError>;

    /// One page of an owner's artifacts, newest first, plus the total row
    /// count for the query.
    async fn query(&self, query: &ArtifactQuery) -> Result<(Vec<Artifact>, i64), RetrievalError>;

    /// The owner's most recent artifacts, newest first.
    async fn latest(
        &self,
        owner_id: &str,
        kind: Option<ArtifactKind>,
        limit: i64,
    ) -> Result<Vec<Artifact>, RetrievalError>;

    /// Delete one of the owner's artifacts. Deleting a row that does not
    /// exist (or belongs to someone else) succeeds without effect.
    async fn delete(&self, id: Uuid, owner_id: &str) -> Result<(), RetrievalError>;
}
