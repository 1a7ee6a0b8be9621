//! Identity service error types

use thiserror::Error;

/// Result type for identity lookups
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors that can occur while resolving a bearer token
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The token is empty, malformed, expired or revoked
    #[error("Invalid or expired token")]
    InvalidCredential,

    /// The identity service answered with an unexpected status
    #[error("Identity service returned status {0}")]
    UpstreamStatus(u16),

    /// The identity service could not be reached
    #[error("Identity service request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The identity service answered with a body we could not read
    #[error("Invalid identity service response: {0}")]
    InvalidResponse(#[from] reqwest::Error),
}
