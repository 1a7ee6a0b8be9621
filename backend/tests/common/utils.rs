use std::io::Cursor;

use axum::response::Response;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::json;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Encode a solid-colour image of the given size
pub fn generate_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    generate_coloured_image(width, height, [30, 120, 220], format)
}

/// Encode an image of the given size filled with `colour`
pub fn generate_coloured_image(
    width: u32,
    height: u32,
    colour: [u8; 3],
    format: ImageFormat,
) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(colour));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .unwrap();
    buffer
}

/// Base64 JPEG, wider than tall so both renditions are cropped
pub fn sample_jpeg_base64() -> String {
    STANDARD.encode(generate_test_image(640, 480, ImageFormat::Jpeg))
}

/// Base64 JPEG with its trailing `=` padding stripped
pub fn unpadded_jpeg_base64() -> String {
    (40..80)
        .map(|size| STANDARD.encode(generate_test_image(size, size, ImageFormat::Jpeg)))
        .find(|encoded| encoded.ends_with('='))
        .map(|encoded| encoded.trim_end_matches('=').to_string())
        .expect("one of the sizes needs padding")
}

/// Upload body for the given image and content type
pub fn upload_payload(image: &str, content_type: &str) -> serde_json::Value {
    json!({
        "image": image,
        "filename": "avatar.jpg",
        "contentType": content_type,
    })
}

/// Dimensions of an encoded image
pub fn image_dimensions(bytes: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(bytes).unwrap();
    (image.width(), image.height())
}
