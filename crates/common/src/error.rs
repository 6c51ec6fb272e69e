//! Common error types and handling for Atelier

use serde_json::json;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Atelier pipeline.
///
/// Component crates define closed error enums for their own failure families
/// (validation, upload, retrieval, generation) and convert into this type at
/// the pipeline boundary. No variant here is fatal to the process — every
/// failure is scoped to one job or one artifact.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code for API responses and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Upload(_) => "UPLOAD_ERROR",
            Error::Retrieval(_) => "RETRIEVAL_ERROR",
            Error::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Render the error as the JSON body shape callers consume
    pub fn to_body(&self) -> serde_json::Value {
        json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        })
    }
}
