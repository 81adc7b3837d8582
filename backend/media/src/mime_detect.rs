//! MIME type to file extension mapping for downloaded images.

/// Extension used when the server sends no usable `Content-Type`.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Pick a file extension from a `Content-Type` header value.
///
/// Parameters such as `; charset=...` are ignored. Anything that is not a
/// known image type falls back to [`DEFAULT_IMAGE_EXTENSION`].
pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        "image/bmp" => "bmp",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/tiff" => "tiff",
        _ => DEFAULT_IMAGE_EXTENSION,
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.trim_start().to_ascii_lowercase().starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_types() {
        assert_eq!(extension_for_content_type(Some("image/jpeg")), "jpg");
        assert_eq!(extension_for_content_type(Some("image/webp")), "webp");
        assert_eq!(extension_for_content_type(Some("IMAGE/GIF")), "gif");
    }

    #[test]
    fn ignores_parameters() {
        assert_eq!(extension_for_content_type(Some("image/svg+xml; charset=utf-8")), "svg");
    }

    #[test]
    fn unknown_or_missing_falls_back_to_png() {
        assert_eq!(extension_for_content_type(None), "png");
        assert_eq!(extension_for_content_type(Some("application/octet-stream")), "png");
        assert_eq!(extension_for_content_type(Some("")), "png");
    }

    #[test]
    fn detects_images() {
        assert!(is_image("image/png"));
        assert!(!is_image("text/html"));
    }
}
