//! Object storage for avatar renditions

mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
mod s3;

pub use error::{BucketError, BucketResult};
pub use s3::S3AvatarStore;

/// Per-object size cap applied to every avatar upload
pub const MAX_OBJECT_BYTES: usize = 2 * 1024 * 1024;

/// Outcome of [`AvatarStore::ensure_bucket`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    /// The bucket was already there
    Exists,
    /// The bucket was missing and has been created with public read access
    Created,
}

/// Object store holding publicly readable avatar images
#[async_trait::async_trait]
pub trait AvatarStore: Send + Sync {
    /// Makes sure the avatar bucket exists, creating it when the lookup reports it missing
    ///
    /// Idempotent. Lookup failures other than "not found" are returned without creating
    /// anything.
    async fn ensure_bucket(&self) -> BucketResult<BucketStatus>;

    /// Deletes the given keys; absent keys are not an error
    async fn delete_objects(&self, keys: &[String]) -> BucketResult<()>;

    /// Writes `body` under `key`, replacing any existing object
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> BucketResult<()>;

    /// Public URL of `key`; does not check that the object exists
    fn public_url(&self, key: &str) -> String;
}
