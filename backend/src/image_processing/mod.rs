//! Decoding and resizing of uploaded avatar images
//!
//! Every rendition is a square produced by scaling the source until it covers the target
//! and centre-cropping the overflow, so the aspect ratio of the subject is preserved.

mod error;

use std::io::Cursor;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use image::{imageops::FilterType, DynamicImage, ImageFormat};

pub use error::{ImageError, ImageResult};

/// Edge length of the large avatar rendition in pixels
pub const LARGE_AVATAR_SIZE: u32 = 400;

/// Edge length of the small avatar rendition in pixels
pub const SMALL_AVATAR_SIZE: u32 = 80;

/// Standard alphabet, with or without trailing `=` padding, as browsers' `atob` accepts
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encoded avatar renditions ready for upload
#[derive(Debug, Clone)]
pub struct AvatarRenditions {
    /// `LARGE_AVATAR_SIZE` square
    pub large: Vec<u8>,
    /// `SMALL_AVATAR_SIZE` square
    pub small: Vec<u8>,
}

/// Decodes a base64 image payload, tolerating a leading data URL header
///
/// `data:image/png;base64,iVBORw0...` and `iVBORw0...` decode to the same bytes.
///
/// # Errors
///
/// Returns `ImageError::InvalidBase64` if the payload is not valid base64
pub fn decode_base64_payload(image: &str) -> ImageResult<Vec<u8>> {
    // Base64 never contains a comma, so anything before the first one is a header
    let payload = image.split_once(',').map_or(image, |(_, data)| data);

    Ok(PAYLOAD_ENGINE.decode(payload.trim())?)
}

/// File extension for a MIME type: its subtype without parameters
#[must_use]
pub fn extension_from_content_type(content_type: &str) -> &str {
    let subtype = content_type
        .split_once('/')
        .map_or(content_type, |(_, subtype)| subtype);

    subtype
        .split_once(';')
        .map_or(subtype, |(subtype, _)| subtype)
        .trim()
}

/// Decodes `bytes` and renders both avatar sizes encoded as `content_type`
///
/// This is CPU bound; callers on the async runtime should run it on the blocking pool.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the bytes are not a supported image,
/// `ImageError::UnsupportedFormat` if `content_type` cannot be encoded, or
/// `ImageError::Encode` if encoding a rendition fails
pub fn render_avatars(bytes: &[u8], content_type: &str) -> ImageResult<AvatarRenditions> {
    let source = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    let format = output_format(content_type)?;

    tracing::debug!(
        width = source.width(),
        height = source.height(),
        ?format,
        "Rendering avatar"
    );

    Ok(AvatarRenditions {
        large: encode(&fill_square(&source, LARGE_AVATAR_SIZE), format)?,
        small: encode(&fill_square(&source, SMALL_AVATAR_SIZE), format)?,
    })
}

fn output_format(content_type: &str) -> ImageResult<ImageFormat> {
    ImageFormat::from_mime_type(content_type)
        .filter(ImageFormat::writing_enabled)
        .ok_or_else(|| ImageError::UnsupportedFormat(content_type.to_string()))
}

fn fill_square(source: &DynamicImage, size: u32) -> DynamicImage {
    source.resize_to_fill(size, size, FilterType::Lanczos3)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> ImageResult<Vec<u8>> {
    // JPEG has no alpha channel
    let pixels = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        DynamicImage::ImageRgba8(image.to_rgba8())
    };

    let mut buffer = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut buffer), format)
        .map_err(ImageError::Encode)?;

    Ok(buffer)
}
