//! Pre-upload media validation
//!
//! Runs entirely in memory, before any network call. Only embedded-data
//! inputs are accepted: remote references require a trusted intermediary to
//! fetch and re-upload, which this path does not have.

use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum accepted media size (10 MiB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Accepted image formats
pub const ALLOWED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp"];

static DATA_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/([a-zA-Z0-9]+);base64,").expect("data URI regex is valid")
});

/// Validation failure, raised before any network side effect. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File size {size} exceeds the maximum allowed size of {max} bytes")]
    FileSizeExceeded { size: usize, max: usize },

    #[error("Invalid file format: {format}. Allowed formats are: jpg, jpeg, png, webp")]
    InvalidFormat { format: String },

    #[error("{0}")]
    InvalidInput(String),
}

impl ValidationError {
    /// Stable error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FileSizeExceeded { .. } => "FILE_SIZE_EXCEEDED",
            ValidationError::InvalidFormat { .. } => "INVALID_FORMAT",
            ValidationError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

/// Decoded media that passed validation, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMedia {
    pub bytes: Vec<u8>,
    pub format: String,
    pub size_bytes: usize,
}

impl ValidatedMedia {
    /// Content type for the upload form part.
    pub fn content_type(&self) -> String {
        // "jpg" is a file extension, not a mime subtype
        let subtype = if self.format == "jpg" { "jpeg" } else { &self.format };
        format!("image/{subtype}")
    }
}

/// Validate an embedded-data media input against size and format constraints.
///
/// `declared_size` and `declared_format` are checked when provided; the size
/// is otherwise estimated from the base64 payload length so oversized inputs
/// are rejected before decoding.
pub fn validate(
    input: &str,
    declared_size: Option<usize>,
    declared_format: Option<&str>,
) -> Result<ValidatedMedia, ValidationError> {
    if input.starts_with("http") {
        return Err(ValidationError::InvalidInput(
            "Remote URL uploads require server-side processing and are not supported here"
                .to_string(),
        ));
    }
    if !input.starts_with("data:") {
        return Err(ValidationError::InvalidInput(
            "Input must be a base64 encoded image or a valid URL".to_string(),
        ));
    }

    let payload = match input.split_once(',') {
        Some((_, payload)) if !payload.is_empty() => payload,
        _ => {
            return Err(ValidationError::InvalidInput(
                "Data URI carries no payload".to_string(),
            ))
        }
    };
    let estimated_size = declared_size.unwrap_or_else(|| (payload.len() * 3).div_ceil(4));
    if estimated_size > MAX_FILE_SIZE {
        return Err(ValidationError::FileSizeExceeded {
            size: estimated_size,
            max: MAX_FILE_SIZE,
        });
    }

    if let Some(format) = declared_format {
        if !ALLOWED_FORMATS.contains(&format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidFormat {
                format: format.to_string(),
            });
        }
    }

    let format = match DATA_URI_REGEX.captures(input) {
        Some(captures) => captures[1].to_lowercase(),
        None => {
            return Err(ValidationError::InvalidFormat {
                format: "unknown".to_string(),
            })
        }
    };
    if !ALLOWED_FORMATS.contains(&format.as_str()) {
        return Err(ValidationError::InvalidFormat { format });
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| ValidationError::InvalidInput("Invalid base64 payload".to_string()))?;
    let size_bytes = bytes.len();

    Ok(ValidatedMedia {
        bytes,
        format,
        size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn data_uri(format: &str, bytes: &[u8]) -> String {
        format!(
            "data:image/{};base64,{}",
            format,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn test_supported_formats_pass() {
        for format in ["jpeg", "png", "webp"] {
            let input = data_uri(format, b"fake image bytes");
            let media = validate(&input, None, None).unwrap();
            assert_eq!(media.format, format);
            assert_eq!(media.size_bytes, 16);
        }
    }

    #[test]
    fn test_jpg_alias_passes() {
        let input = data_uri("jpg", b"fake");
        let media = validate(&input, None, None).unwrap();
        assert_eq!(media.content_type(), "image/jpeg");
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let input = data_uri("gif", b"animated");
        let err = validate(&input, None, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FORMAT");
        assert_eq!(
            err,
            ValidationError::InvalidFormat {
                format: "gif".to_string()
            }
        );
    }

    #[test]
    fn test_declared_format_rejected() {
        let input = data_uri("png", b"bytes");
        let err = validate(&input, None, Some("tiff")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FORMAT");
    }

    #[test]
    fn test_declared_size_over_cap_rejected() {
        let input = data_uri("png", b"tiny");
        let err = validate(&input, Some(MAX_FILE_SIZE + 1), None).unwrap_err();
        assert_eq!(err.error_code(), "FILE_SIZE_EXCEEDED");
    }

    #[test]
    fn test_oversized_payload_rejected_from_estimate() {
        // Payload whose base64 length alone puts it over the cap; must be
        // rejected without attempting a decode of 10+ MiB
        let payload = "A".repeat((MAX_FILE_SIZE / 3) * 4 + 8);
        let input = format!("data:image/png;base64,{payload}");
        let err = validate(&input, None, None).unwrap_err();
        assert_eq!(err.error_code(), "FILE_SIZE_EXCEEDED");
    }

    #[test]
    fn test_size_at_cap_accepted() {
        let input = data_uri("png", b"ok");
        assert!(validate(&input, Some(MAX_FILE_SIZE), None).is_ok());
    }

    #[test]
    fn test_remote_url_rejected() {
        let err = validate("https://example.com/photo.png", None, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_garbage_input_rejected() {
        let err = validate("not-a-data-uri", None, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_missing_mime_rejected() {
        let err = validate("data:;base64,AAAA", None, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FORMAT");
    }

    #[test]
    fn test_empty_payload_rejected() {
        // With and without the trailing comma: neither carries any bytes
        let err = validate("data:image/png;base64,", None, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = validate("data:image/png;base64", None, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = validate("data:image/png;base64,!!!not base64!!!", None, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
