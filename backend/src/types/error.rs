//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::avatar::AvatarError;

const MISSING_AUTHORIZATION: &str = "Missing authorization header";
const UNAUTHORIZED: &str = "Unauthorized";
const MISSING_FIELDS: &str = "Missing required fields: image, filename, contentType";
const INVALID_FILE_TYPE: &str = "Invalid file type. Only images are allowed.";
const INVALID_JSON: &str = "Invalid JSON payload";
const PROCESSING_FAILED: &str = "Failed to process image";
const PAYLOAD_TOO_LARGE: &str = "Request body too large";

/// API error response body
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Underlying cause, when it is safe to share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: error.into(),
                details: None,
            },
        }
    }

    /// Attaches the underlying cause to the response body
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.inner.details = Some(details.into());
        self
    }

    /// No `Authorization` header on a protected route
    #[must_use]
    pub fn missing_authorization() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, MISSING_AUTHORIZATION)
    }

    /// The bearer token did not resolve to a user
    #[must_use]
    pub fn unauthorized(details: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED).with_details(details)
    }

    /// `image`, `filename` or `contentType` is absent or empty
    #[must_use]
    pub fn missing_fields() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MISSING_FIELDS)
    }

    /// `contentType` is not an `image/*` type
    #[must_use]
    pub fn invalid_file_type() -> Self {
        Self::new(StatusCode::BAD_REQUEST, INVALID_FILE_TYPE)
    }

    /// The body is not JSON
    #[must_use]
    pub fn invalid_json() -> Self {
        Self::new(StatusCode::BAD_REQUEST, INVALID_JSON)
    }

    /// The body exceeds the request size limit
    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE)
    }

    /// Image decoding, storage or profile update failed
    #[must_use]
    pub fn processing_failed(details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED).with_details(details)
    }

    /// Maps a validator error code onto a client error
    #[must_use]
    pub fn from_validation_code(code: &str) -> Self {
        match code {
            "missing_fields" => Self::missing_fields(),
            "invalid_file_type" => Self::invalid_file_type(),
            _ => Self::new(StatusCode::BAD_REQUEST, "Request validation failed"),
        }
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Error message of the response
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.error
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error,
                self.inner.details.as_deref().unwrap_or_default()
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error,
                self.inner.details.as_deref().unwrap_or_default()
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Every failure past request validation surfaces as a processing failure
impl From<AvatarError> for AppError {
    fn from(err: AvatarError) -> Self {
        Self::processing_failed(err.to_string())
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
