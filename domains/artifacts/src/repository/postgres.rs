//! Postgres artifact store

use crate::domain::entities::{Artifact, ArtifactKind};
use crate::repository::{ArtifactQuery, ArtifactStore, RetrievalError};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// All columns in the artifacts table, used for SELECT and RETURNING clauses.
const ARTIFACT_COLUMNS: &str = "\
    id, owner_id, kind, \
    public_id, url, secure_url, \
    format, width, height, size_bytes, resource_type, tags, \
    prompt, style, created_at";

#[derive(Clone)]
pub struct PgArtifactStore {
    pool: PgPool,
}

impl PgArtifactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtifactStore for PgArtifactStore {
    async fn insert(&self, artifact: &Artifact) -> Result<Artifact, RetrievalError> {
        let query = format!(
            "INSERT INTO artifacts ({ARTIFACT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {ARTIFACT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Artifact>(&query)
            .bind(artifact.id)
            .bind(&artifact.owner_id)
            .bind(artifact.kind)
            .bind(&artifact.public_id)
            .bind(&artifact.url)
            .bind(&artifact.secure_url)
            .bind(&artifact.format)
            .bind(artifact.width)
            .bind(artifact.height)
            .bind(artifact.size_bytes)
            .bind(&artifact.resource_type)
            .bind(&artifact.tags)
            .bind(&artifact.prompt)
            .bind(&artifact.style)
            .bind(artifact.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(RetrievalError::from_sqlx)?;

        Ok(created)
    }

    async fn query(&self, query: &ArtifactQuery) -> Result<(Vec<Artifact>, i64), RetrievalError> {
        query.validate()?;

        let (kind_filter, count_filter) = match query.kind {
            Some(_) => (" AND kind = $2", " AND kind = $2"),
            None => ("", ""),
        };

        let count_sql =
            format!("SELECT COUNT(*) FROM artifacts WHERE owner_id = $1{count_filter}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(&query.owner_id);
        if let Some(kind) = query.kind {
            count_query = count_query.bind(kind);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(RetrievalError::from_sqlx)?;

        let (limit_param, offset_param) = match query.kind {
            Some(_) => ("$3", "$4"),
            None => ("$2", "$3"),
        };
        let rows_sql = format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts \
             WHERE owner_id = $1{kind_filter} \
             ORDER BY created_at DESC LIMIT {limit_param} OFFSET {offset_param}"
        );
        let mut rows_query = sqlx::query_as::<_, Artifact>(&rows_sql).bind(&query.owner_id);
        if let Some(kind) = query.kind {
            rows_query = rows_query.bind(kind);
        }
        let artifacts = rows_query
            .bind(query.page_size)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(RetrievalError::from_sqlx)?;

        Ok((artifacts, total))
    }

    async fn latest(
        &self,
        owner_id: &str,
        kind: Option<ArtifactKind>,
        limit: i64,
    ) -> Result<Vec<Artifact>, RetrievalError> {
        if limit < 1 {
            return Err(RetrievalError::InvalidParameters(
                "limit must be >= 1".to_string(),
            ));
        }

        let artifacts = match kind {
            Some(kind) => {
                let sql = format!(
                    "SELECT {ARTIFACT_COLUMNS} FROM artifacts \
                     WHERE owner_id = $1 AND kind = $2 \
                     ORDER BY created_at DESC LIMIT $3"
                );
                sqlx::query_as::<_, Artifact>(&sql)
                    .bind(owner_id)
                    .bind(kind)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {ARTIFACT_COLUMNS} FROM artifacts \
                     WHERE owner_id = $1 ORDER BY created_at DESC LIMIT $2"
                );
                sqlx::query_as::<_, Artifact>(&sql)
                    .bind(owner_id)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(RetrievalError::from_sqlx)?;

        Ok(artifacts)
    }

    async fn delete(&self, id: Uuid, owner_id: &str) -> Result<(), RetrievalError> {
        // Idempotent: zero rows affected is still success
        sqlx::query("DELETE FROM artifacts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(RetrievalError::from_sqlx)?;

        Ok(())
    }
}
