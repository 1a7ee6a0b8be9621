//! Error types for bucket operations

use aws_sdk_s3::{config::http::HttpResponse, error::DisplayErrorContext, error::SdkError};
use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur during bucket operations
#[derive(Error, Debug)]
pub enum BucketError {
    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Object exceeds the per-object size cap of the bucket
    #[error("Object {key} is {size} bytes, limit is {limit} bytes")]
    ObjectTooLarge {
        /// Object key
        key: String,
        /// Size of the rejected body
        size: usize,
        /// Configured cap
        limit: usize,
    },
}

impl<E> From<SdkError<E, HttpResponse>> for BucketError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: SdkError<E, HttpResponse>) -> Self {
        let is_upstream = matches!(
            error,
            SdkError::ServiceError(ref service_err) if service_err.raw().status().as_u16() >= 500
        );
        let message = DisplayErrorContext(error).to_string();

        if is_upstream {
            Self::UpstreamError(message)
        } else {
            Self::S3Error(message)
        }
    }
}
