use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use profile_storage::Profile;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::{Validate, ValidationError};

use crate::{
    avatar::AvatarService,
    middleware::AuthenticatedUser,
    types::{AppError, ValidatedJson},
};

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUploadRequest {
    /// Base64 image data, optionally prefixed with a data URL header (`data:image/png;base64,`)
    #[serde(default)]
    #[validate(length(min = 1, message = "missing_fields"))]
    pub image: String,
    /// Original file name, informational only
    #[serde(default)]
    #[validate(length(min = 1, message = "missing_fields"))]
    pub filename: String,
    /// MIME type of the image, e.g. `image/png`
    #[serde(default)]
    #[validate(
        length(min = 1, message = "missing_fields"),
        custom(function = "validate_image_content_type")
    )]
    pub content_type: String,
}

/// Accepts any `image/*` type; an empty value is reported as a missing field instead
fn validate_image_content_type(content_type: &str) -> Result<(), ValidationError> {
    if content_type.is_empty() || content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_file_type"))
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AvatarUploadResponse {
    /// Always `true`
    pub success: bool,
    /// Public URL of the 400x400 rendition
    pub avatar_url: String,
    /// Public URL of the 80x80 rendition
    pub avatar_url_small: String,
    /// Profile row after the update
    pub profile: Profile,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AvatarResponse {
    /// Public URL of the 400x400 rendition, if an avatar was uploaded
    pub avatar_url: Option<String>,
    /// Public URL of the 80x80 rendition, if an avatar was uploaded
    pub avatar_url_small: Option<String>,
    /// Profile row
    pub profile: Profile,
}

/// Replaces the caller's avatar
///
/// Decodes the image, renders the 400x400 and 80x80 squares, uploads both to the avatar
/// bucket and points the caller's profile at the new public URLs.
///
/// # Errors
///
/// - 400 if a field is missing or `contentType` is not an image type
/// - 401 if the bearer token is missing or unknown
/// - 500 with `details` if decoding, uploading or the profile update fails
#[instrument(skip(avatar_service, user, payload), fields(user_id = %user.id, filename = %payload.filename))]
pub async fn upload_avatar(
    Extension(avatar_service): Extension<Arc<AvatarService>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<AvatarUploadRequest>,
) -> Result<Json<AvatarUploadResponse>, AppError> {
    let uploaded = avatar_service
        .process(&user.id, &payload.image, &payload.content_type)
        .await?;

    Ok(Json(AvatarUploadResponse {
        success: true,
        avatar_url: uploaded.avatar_url,
        avatar_url_small: uploaded.avatar_url_small,
        profile: uploaded.profile,
    }))
}

/// Returns the caller's current avatar URLs
///
/// # Errors
///
/// - 401 if the bearer token is missing or unknown
/// - 404 if the caller has no profile row
/// - 500 if the profile cannot be read
#[instrument(skip(avatar_service, user), fields(user_id = %user.id))]
pub async fn get_avatar(
    Extension(avatar_service): Extension<Arc<AvatarService>>,
    user: AuthenticatedUser,
) -> Result<Json<AvatarResponse>, AppError> {
    let profile = avatar_service
        .current(&user.id)
        .await
        .map_err(|e| {
            AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile")
                .with_details(e.to_string())
        })?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "Profile not found"))?;

    Ok(Json(AvatarResponse {
        avatar_url: profile.avatar_url.clone(),
        avatar_url_small: profile.avatar_url_small.clone(),
        profile,
    }))
}
