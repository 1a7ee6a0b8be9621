use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, Method, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{
    identity::{IdentityApi, UserIdentity},
    types::AppError,
};

/// Authenticated user resolved from the bearer token
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedUser {
    /// User id issued by the identity service
    pub id: String,
}

impl From<UserIdentity> for AuthenticatedUser {
    fn from(identity: UserIdentity) -> Self {
        Self { id: identity.id }
    }
}

/// Axum extractor for authenticated user
///
/// Only valid on routes behind [`auth_middleware`]:
/// ```ignore
/// async fn protected_handler(
///     user: AuthenticatedUser,
/// ) -> Result<impl IntoResponse, AppError> {
///     Ok(user.id)
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "Authentication required but user not found in request extensions",
            )
        })
    }
}

/// Bearer token authentication middleware
///
/// This middleware:
/// 1. Rejects requests without an `Authorization` header, or with a blank one
/// 2. Resolves the token (with or without the `Bearer ` prefix) through the identity service
/// 3. Adds `AuthenticatedUser` to request extensions
///
/// Preflight `OPTIONS` requests carry no credentials and pass through untouched.
///
/// # Errors
///
/// - `AppError` - Missing header or unresolvable token with 401 status code
pub async fn auth_middleware(
    Extension(identity_api): Extension<Arc<dyn IdentityApi>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(AppError::missing_authorization)?;

    let header = header
        .to_str()
        .map_err(|_| AppError::unauthorized("Authorization header is not valid ASCII"))?;
    let token = header
        .strip_prefix("Bearer ")
        .unwrap_or(header)
        .trim()
        .to_string();

    // A blank credential is no credential
    if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
        return Err(AppError::missing_authorization());
    }

    let identity = identity_api
        .resolve_user(&token)
        .await
        .map_err(|e| AppError::unauthorized(e.to_string()))?;

    tracing::debug!("Authenticated user {}", identity.id);

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(identity));

    Ok(next.run(request).await)
}
