//! Error types for image processing

use thiserror::Error;

/// Result type for image processing
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur while turning an upload into avatar renditions
#[derive(Error, Debug)]
pub enum ImageError {
    /// The payload is not valid base64
    #[error("Failed to decode base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The bytes are not an image we can read
    #[error("Failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The requested content type has no encoder
    #[error("Unsupported output image type: {0}")]
    UnsupportedFormat(String),

    /// Encoding a rendition failed
    #[error("Failed to encode image: {0}")]
    Encode(image::ImageError),
}
