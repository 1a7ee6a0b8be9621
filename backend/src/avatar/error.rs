//! Avatar ingestion error types

use profile_storage::ProfileStorageError;
use thiserror::Error;

use crate::{avatar_storage::BucketError, image_processing::ImageError};

/// Errors that can occur after a request has been authenticated and validated
#[derive(Error, Debug)]
pub enum AvatarError {
    /// The payload could not be decoded, read as an image, or re-encoded
    #[error("{0}")]
    InvalidImageData(#[from] ImageError),

    /// Uploading a rendition failed
    #[error("Storage failure: {0}")]
    Storage(#[from] BucketError),

    /// Reading or updating the profile row failed
    #[error("Profile storage failure: {0}")]
    Profile(#[from] ProfileStorageError),

    /// Anything else, e.g. a panicked image worker
    #[error("Unexpected failure: {0}")]
    Unknown(String),
}

impl From<tokio::task::JoinError> for AvatarError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Unknown(err.to_string())
    }
}
