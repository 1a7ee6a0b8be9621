//! Profile store seam over `profile_storage`

use profile_storage::{Profile, ProfileStorage, ProfileStorageResult};

/// Read and avatar-update access to profile rows
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Points the avatar columns of an existing profile at new URLs
    async fn update_avatar_urls(
        &self,
        profile_id: &str,
        avatar_url: &str,
        avatar_url_small: &str,
    ) -> ProfileStorageResult<Profile>;

    /// Loads a profile by user id
    async fn get_profile(&self, profile_id: &str) -> ProfileStorageResult<Option<Profile>>;
}

#[async_trait::async_trait]
impl ProfileStore for ProfileStorage {
    async fn update_avatar_urls(
        &self,
        profile_id: &str,
        avatar_url: &str,
        avatar_url_small: &str,
    ) -> ProfileStorageResult<Profile> {
        Self::update_avatar_urls(self, profile_id, avatar_url, avatar_url_small).await
    }

    async fn get_profile(&self, profile_id: &str) -> ProfileStorageResult<Option<Profile>> {
        self.get_by_id(profile_id).await
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    use chrono::Utc;
    use profile_storage::{Profile, ProfileStorageError, ProfileStorageResult};

    use super::ProfileStore;

    /// Profile store backed by a map
    #[derive(Default)]
    pub struct InMemoryProfileStore {
        profiles: Mutex<HashMap<String, Profile>>,
    }

    impl InMemoryProfileStore {
        /// Creates an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds a profile row
        #[must_use]
        pub fn with_profile(self, profile: Profile) -> Self {
            self.profiles().insert(profile.id.clone(), profile);
            self
        }

        /// Current state of a profile row
        #[must_use]
        pub fn profile(&self, profile_id: &str) -> Option<Profile> {
            self.profiles().get(profile_id).cloned()
        }

        fn profiles(&self) -> MutexGuard<'_, HashMap<String, Profile>> {
            self.profiles.lock().expect("profile store lock poisoned")
        }
    }

    #[async_trait::async_trait]
    impl ProfileStore for InMemoryProfileStore {
        async fn update_avatar_urls(
            &self,
            profile_id: &str,
            avatar_url: &str,
            avatar_url_small: &str,
        ) -> ProfileStorageResult<Profile> {
            let mut profiles = self.profiles();
            let profile = profiles
                .get_mut(profile_id)
                .ok_or_else(|| ProfileStorageError::ProfileNotFound(profile_id.to_string()))?;

            profile.avatar_url = Some(avatar_url.to_string());
            profile.avatar_url_small = Some(avatar_url_small.to_string());
            profile.updated_at = Some(Utc::now().to_rfc3339());

            Ok(profile.clone())
        }

        async fn get_profile(&self, profile_id: &str) -> ProfileStorageResult<Option<Profile>> {
            Ok(self.profiles().get(profile_id).cloned())
        }
    }
}
