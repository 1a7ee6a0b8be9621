//! In-memory avatar store for tests

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::{AvatarStore, BucketError, BucketResult, BucketStatus, MAX_OBJECT_BYTES};

/// Object held by [`InMemoryAvatarStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object bytes
    pub body: Vec<u8>,
    /// Content type given at upload
    pub content_type: String,
}

#[derive(Default)]
struct State {
    bucket_exists: bool,
    fail_bucket_lookup: bool,
    fail_deletes: bool,
    failing_uploads: HashSet<String>,
    objects: BTreeMap<String, StoredObject>,
}

/// Avatar store backed by a map, with switches to inject failures
pub struct InMemoryAvatarStore {
    public_base_url: String,
    state: Mutex<State>,
}

impl InMemoryAvatarStore {
    /// Creates a store whose bucket does not exist yet
    #[must_use]
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Marks the bucket as already created
    #[must_use]
    pub fn with_existing_bucket(self) -> Self {
        self.state().bucket_exists = true;
        self
    }

    /// Makes every bucket lookup fail with an upstream error
    pub fn fail_bucket_lookup(&self) {
        self.state().fail_bucket_lookup = true;
    }

    /// Makes every delete fail
    pub fn fail_deletes(&self) {
        self.state().fail_deletes = true;
    }

    /// Makes uploads to `key` fail
    pub fn fail_uploads_for(&self, key: impl Into<String>) {
        self.state().failing_uploads.insert(key.into());
    }

    /// Whether the bucket exists
    #[must_use]
    pub fn bucket_exists(&self) -> bool {
        self.state().bucket_exists
    }

    /// Object stored under `key`
    #[must_use]
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.state().objects.get(key).cloned()
    }

    /// All stored keys in lexical order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.state().objects.keys().cloned().collect()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("avatar store lock poisoned")
    }
}

#[async_trait::async_trait]
impl AvatarStore for InMemoryAvatarStore {
    async fn ensure_bucket(&self) -> BucketResult<BucketStatus> {
        let mut state = self.state();

        if state.fail_bucket_lookup {
            return Err(BucketError::UpstreamError("bucket lookup failed".to_string()));
        }

        if state.bucket_exists {
            Ok(BucketStatus::Exists)
        } else {
            state.bucket_exists = true;
            Ok(BucketStatus::Created)
        }
    }

    async fn delete_objects(&self, keys: &[String]) -> BucketResult<()> {
        let mut state = self.state();

        if state.fail_deletes {
            return Err(BucketError::S3Error("delete failed".to_string()));
        }

        for key in keys {
            state.objects.remove(key);
        }

        Ok(())
    }

    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> BucketResult<()> {
        let mut state = self.state();

        if !state.bucket_exists {
            return Err(BucketError::S3Error("NoSuchBucket".to_string()));
        }

        if state.failing_uploads.contains(key) {
            return Err(BucketError::S3Error(format!("upload of {key} failed")));
        }

        if body.len() > MAX_OBJECT_BYTES {
            return Err(BucketError::ObjectTooLarge {
                key: key.to_string(),
                size: body.len(),
                limit: MAX_OBJECT_BYTES,
            });
        }

        state.objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}
