//! Delivery URL transformations
//!
//! The storage CDN derives resized and recompressed variants from a
//! transformation segment inserted into the delivery URL. URLs that are not
//! storage delivery URLs pass through unchanged.

/// Insert a `w_{width},f_{format},q_{quality}` transformation into a storage
/// delivery URL.
pub fn transformed_url(url: &str, width: u32, format: &str, quality: &str) -> String {
    let Some((base, public_id_path)) = url.split_once("/image/upload/") else {
        return url.to_string();
    };
    if base.is_empty() || public_id_path.is_empty() {
        return url.to_string();
    }

    format!("{base}/image/upload/w_{width},f_{format},q_{quality}/{public_id_path}")
}

/// Gallery thumbnail variant: 800px wide, format and quality negotiated by
/// the CDN.
pub fn thumbnail_url(url: &str) -> String {
    transformed_url(url, 800, "auto", "auto")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformation_inserted() {
        let url = "https://res.example.com/demo/image/upload/v1/generated_interiors/u1/u1_17.png";
        assert_eq!(
            transformed_url(url, 400, "webp", "80"),
            "https://res.example.com/demo/image/upload/w_400,f_webp,q_80/v1/generated_interiors/u1/u1_17.png"
        );
    }

    #[test]
    fn test_thumbnail_defaults() {
        let url = "https://res.example.com/demo/image/upload/v1/a.png";
        assert_eq!(
            thumbnail_url(url),
            "https://res.example.com/demo/image/upload/w_800,f_auto,q_auto/v1/a.png"
        );
    }

    #[test]
    fn test_non_storage_url_passes_through() {
        let url = "https://cdn.other.com/photos/a.png";
        assert_eq!(thumbnail_url(url), url);
    }

    #[test]
    fn test_trailing_upload_segment_passes_through() {
        let url = "https://res.example.com/demo/image/upload/";
        assert_eq!(thumbnail_url(url), url);
    }
}
