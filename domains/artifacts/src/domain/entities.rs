//! Domain entities for the Artifacts domain
//!
//! An artifact is the metadata record of one stored media object. The bytes
//! live in durable storage; the row records where they are and who owns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_common::{Error, Result};
use atelier_storage::UploadedObject;

/// Default gallery page size.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Artifact kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "artifact_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Image,
    Video,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Image => write!(f, "image"),
            ArtifactKind::Video => write!(f, "video"),
        }
    }
}

/// Artifact entity — one stored media object's metadata record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Artifact {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: ArtifactKind,
    /// Storage key of the backing object.
    pub public_id: String,
    pub url: String,
    pub secure_url: String,
    pub format: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub size_bytes: i64,
    pub resource_type: String,
    pub tags: Vec<String>,
    pub prompt: Option<String>,
    pub style: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Build an image artifact from a completed storage upload.
    pub fn from_upload(
        owner_id: &str,
        object: &UploadedObject,
        prompt: Option<String>,
        style: Option<String>,
    ) -> Result<Self> {
        let artifact = Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            kind: ArtifactKind::Image,
            public_id: object.public_id.clone(),
            url: object.url.clone(),
            secure_url: object.secure_url.clone(),
            format: object.format.clone(),
            width: object.width,
            height: object.height,
            size_bytes: object.bytes,
            resource_type: object.resource_type.clone(),
            tags: object.tags.clone(),
            prompt,
            style,
            created_at: Utc::now(),
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Build a video artifact from a finished generation job.
    pub fn from_generation(
        owner_id: &str,
        url: &str,
        public_id: &str,
        prompt: Option<String>,
    ) -> Result<Self> {
        let artifact = Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            kind: ArtifactKind::Video,
            public_id: public_id.to_string(),
            url: url.to_string(),
            secure_url: url.to_string(),
            format: "mp4".to_string(),
            width: None,
            height: None,
            size_bytes: 0,
            resource_type: "video".to_string(),
            tags: vec![format!("user_{owner_id}")],
            prompt,
            style: None,
            created_at: Utc::now(),
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(Error::Validation(
                "Artifacts require a non-empty owner".to_string(),
            ));
        }
        if self.public_id.trim().is_empty() {
            return Err(Error::Validation(
                "Artifacts require a storage public_id".to_string(),
            ));
        }
        if self.url.trim().is_empty() {
            return Err(Error::Validation(
                "Artifacts require a delivery URL".to_string(),
            ));
        }
        if self.size_bytes < 0 {
            return Err(Error::Validation(
                "Artifact size must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One page of a user's gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryPage {
    pub items: Vec<Artifact>,
    pub page: i64,
    pub page_size: i64,
    /// Count of rows matching the query, before liveness filtering.
    pub total_items: i64,
    pub total_pages: i64,
}

/// Page count for a result set: `ceil(total / page_size)`. Zero rows means
/// zero pages.
pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded_object() -> UploadedObject {
        UploadedObject {
            asset_id: "asset-1".to_string(),
            public_id: "u1_1700000000000".to_string(),
            url: "http://res.test/image/upload/u1_1700000000000.png".to_string(),
            secure_url: "https://res.test/image/upload/u1_1700000000000.png".to_string(),
            format: "png".to_string(),
            width: Some(1024),
            height: Some(768),
            bytes: 2048,
            resource_type: "image".to_string(),
            tags: vec!["user_u1".to_string()],
        }
    }

    #[test]
    fn test_artifact_kind_display() {
        assert_eq!(ArtifactKind::Image.to_string(), "image");
        assert_eq!(ArtifactKind::Video.to_string(), "video");
    }

    #[test]
    fn test_from_upload_copies_object_metadata() {
        let artifact = Artifact::from_upload(
            "u1",
            &uploaded_object(),
            Some("modern loft".to_string()),
            Some("scandinavian".to_string()),
        )
        .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Image);
        assert_eq!(artifact.owner_id, "u1");
        assert_eq!(artifact.public_id, "u1_1700000000000");
        assert_eq!(artifact.size_bytes, 2048);
        assert_eq!(artifact.width, Some(1024));
        assert_eq!(artifact.prompt.as_deref(), Some("modern loft"));
    }

    #[test]
    fn test_from_upload_rejects_empty_owner() {
        let result = Artifact::from_upload("  ", &uploaded_object(), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_generation_builds_video_artifact() {
        let artifact = Artifact::from_generation(
            "u1",
            "https://res.test/video/upload/req-1.mp4",
            "videos/req-1",
            Some("slow pan".to_string()),
        )
        .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Video);
        assert_eq!(artifact.resource_type, "video");
        assert_eq!(artifact.format, "mp4");
        assert_eq!(artifact.tags, vec!["user_u1".to_string()]);
    }

    #[test]
    fn test_from_generation_rejects_empty_url() {
        assert!(Artifact::from_generation("u1", "", "videos/x", None).is_err());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(25, 12), 3);
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(0, 12), 0);
    }

    #[test]
    fn test_total_pages_bad_page_size() {
        assert_eq!(total_pages(10, 0), 0);
    }
}
