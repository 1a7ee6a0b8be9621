use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    avatar_storage::MAX_OBJECT_BYTES,
    image_processing::{LARGE_AVATAR_SIZE, SMALL_AVATAR_SIZE},
};

/// Image types the service can re-encode
const ACCEPTED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

#[derive(Serialize, JsonSchema)]
pub struct AvatarConfigResponse {
    /// Edge length of the large rendition in pixels
    large_size: u32,
    /// Edge length of the small rendition in pixels
    small_size: u32,
    /// Maximum size of a stored rendition in bytes
    max_object_bytes: usize,
    /// Values accepted in `contentType`
    accepted_content_types: Vec<&'static str>,
}

/// Upload limits, so clients can reject files before sending them
pub async fn get_config() -> Json<AvatarConfigResponse> {
    Json(AvatarConfigResponse {
        large_size: LARGE_AVATAR_SIZE,
        small_size: SMALL_AVATAR_SIZE,
        max_object_bytes: MAX_OBJECT_BYTES,
        accepted_content_types: ACCEPTED_CONTENT_TYPES.to_vec(),
    })
}
