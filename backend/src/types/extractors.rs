//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use serde_json::error::Category;
use validator::{Validate, ValidationErrors};

use crate::types::error::AppError;

/// Custom JSON extractor that validates the payload
///
/// The body is parsed as JSON whatever its `Content-Type`, since browser `fetch` calls
/// without explicit headers send `text/plain`.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => AppError::payload_too_large(),
                status => AppError::new(status, "Failed to read request body"),
            }
        })?;

        let payload: T = serde_json::from_slice(&body).map_err(|err| match err.classify() {
            // Well-formed JSON with the wrong shape, e.g. `"image": null`
            Category::Data => AppError::missing_fields(),
            _ => AppError::invalid_json(),
        })?;

        payload.validate().map_err(|errors| rejection_for(&errors))?;

        Ok(Self(payload))
    }
}

/// Picks the client error for a failed validation
///
/// Missing fields win over any other failure so an empty payload is never reported as a
/// bad file type.
fn rejection_for(errors: &ValidationErrors) -> AppError {
    let codes: Vec<&str> = errors
        .field_errors()
        .into_values()
        .flatten()
        .map(|error| {
            error
                .message
                .as_deref()
                .unwrap_or_else(|| error.code.as_ref())
        })
        .collect();

    if codes.contains(&"missing_fields") {
        return AppError::missing_fields();
    }

    codes.first().map_or_else(
        || AppError::from_validation_code("validation_error"),
        |code| AppError::from_validation_code(code),
    )
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}
