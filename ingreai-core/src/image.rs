//! Validation for user-supplied ingredient photos.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

/// Formats accepted for ingredient photos.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum upload size for an ingredient photo (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Sniff the image format from its magic bytes and check it's one we send upstream.
///
/// Returns the MIME type on success (e.g., "image/jpeg"). Only the header is
/// inspected; full decoding is left to the backend.
pub fn validate_image(data: &[u8]) -> Result<&'static str, String> {
    if data.is_empty() {
        return Err("Image is empty".to_string());
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(format!(
            "Image too large: {} bytes (max {})",
            data.len(),
            MAX_FILE_SIZE
        ));
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    let format = reader
        .format()
        .ok_or_else(|| "Could not detect image format".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    Ok(format.to_mime_type())
}
