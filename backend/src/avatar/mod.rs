//! Avatar ingestion workflow
//!
//! One upload runs these steps in order, each awaited before the next:
//! 1. Decode the base64 payload and render the large and small squares
//! 2. Make sure the bucket exists (best effort)
//! 3. Remove the previous pair (best effort)
//! 4. Upload large, then small
//! 5. Point the profile row at the new public URLs
//!
//! A failure in step 4 or 5 is returned as-is. Objects written before the failure are left
//! in place, so a failed request can leave a large rendition without its small sibling, or
//! a complete pair that no profile references.

mod error;

use std::sync::Arc;

use profile_storage::Profile;
use tracing::{debug, info, instrument, warn};

use crate::{
    avatar_storage::AvatarStore,
    image_processing::{decode_base64_payload, extension_from_content_type, render_avatars},
    profiles::ProfileStore,
};

pub use error::AvatarError;

/// Object keys of a user's avatar pair
///
/// Keys depend only on the user id and extension, so a new upload replaces the old pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarKeys {
    /// Key of the large rendition
    pub large: String,
    /// Key of the small rendition
    pub small: String,
}

impl AvatarKeys {
    /// `{user_id}-L.{extension}` and `{user_id}-S.{extension}`
    #[must_use]
    pub fn for_user(user_id: &str, extension: &str) -> Self {
        Self {
            large: format!("{user_id}-L.{extension}"),
            small: format!("{user_id}-S.{extension}"),
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadedAvatar {
    /// Public URL of the large rendition
    pub avatar_url: String,
    /// Public URL of the small rendition
    pub avatar_url_small: String,
    /// Profile row after the update
    pub profile: Profile,
}

/// Turns uploaded images into stored avatars
pub struct AvatarService {
    avatar_store: Arc<dyn AvatarStore>,
    profile_store: Arc<dyn ProfileStore>,
}

impl AvatarService {
    /// Creates a new avatar service
    #[must_use]
    pub fn new(avatar_store: Arc<dyn AvatarStore>, profile_store: Arc<dyn ProfileStore>) -> Self {
        Self {
            avatar_store,
            profile_store,
        }
    }

    /// Stores `image` as the avatar of `user_id`
    ///
    /// `content_type` must already be known to be an `image/*` type; it names both the
    /// output encoding and the object extension.
    ///
    /// # Errors
    ///
    /// - `AvatarError::InvalidImageData` if the payload cannot be decoded or re-encoded
    /// - `AvatarError::Storage` if either upload fails
    /// - `AvatarError::Profile` if the profile row cannot be updated
    /// - `AvatarError::Unknown` if the image worker dies
    #[instrument(skip(self, image), fields(image_len = image.len()))]
    pub async fn process(
        &self,
        user_id: &str,
        image: &str,
        content_type: &str,
    ) -> Result<UploadedAvatar, AvatarError> {
        let bytes = decode_base64_payload(image)?;
        let keys = AvatarKeys::for_user(user_id, extension_from_content_type(content_type));

        let output_type = content_type.to_string();
        let renditions =
            tokio::task::spawn_blocking(move || render_avatars(&bytes, &output_type)).await??;

        // Lookup errors are not fatal: the bucket usually exists and the upload decides
        match self.avatar_store.ensure_bucket().await {
            Ok(status) => debug!("Avatar bucket status: {status:?}"),
            Err(e) => warn!("Avatar bucket check failed, uploading anyway: {e}"),
        }

        // The pair may not exist yet, and the uploads below overwrite it anyway
        if let Err(e) = self
            .avatar_store
            .delete_objects(&[keys.large.clone(), keys.small.clone()])
            .await
        {
            debug!("Removing previous avatar failed: {e}");
        }

        self.avatar_store
            .put_object(&keys.large, renditions.large, content_type)
            .await?;
        self.avatar_store
            .put_object(&keys.small, renditions.small, content_type)
            .await?;

        let avatar_url = self.avatar_store.public_url(&keys.large);
        let avatar_url_small = self.avatar_store.public_url(&keys.small);

        let profile = self
            .profile_store
            .update_avatar_urls(user_id, &avatar_url, &avatar_url_small)
            .await?;

        info!("Stored avatar {} for user {user_id}", keys.large);

        Ok(UploadedAvatar {
            avatar_url,
            avatar_url_small,
            profile,
        })
    }

    /// Profile of `user_id`, if one exists
    ///
    /// # Errors
    ///
    /// Returns `AvatarError::Profile` if the profile cannot be read
    pub async fn current(&self, user_id: &str) -> Result<Option<Profile>, AvatarError> {
        Ok(self.profile_store.get_profile(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar_storage::memory::InMemoryAvatarStore;
    use crate::image_processing::ImageError;
    use crate::profiles::memory::InMemoryProfileStore;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use profile_storage::ProfileStorageError;
    use std::io::Cursor;

    const BASE_URL: &str = "http://localhost:4566/creatorino-avatars";

    fn sample_png_base64() -> String {
        let image = RgbImage::from_pixel(120, 90, Rgb([200, 40, 40]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        STANDARD.encode(buffer)
    }

    fn service(
        avatar_store: &Arc<InMemoryAvatarStore>,
        profile_store: &Arc<InMemoryProfileStore>,
    ) -> AvatarService {
        AvatarService::new(avatar_store.clone(), profile_store.clone())
    }

    #[test]
    fn test_keys_are_derived_from_user_and_extension() {
        let keys = AvatarKeys::for_user("user-1", "webp");
        assert_eq!(keys.large, "user-1-L.webp");
        assert_eq!(keys.small, "user-1-S.webp");
    }

    #[tokio::test]
    async fn test_process_creates_missing_bucket() {
        let avatar_store = Arc::new(InMemoryAvatarStore::new(BASE_URL));
        let profile_store =
            Arc::new(InMemoryProfileStore::new().with_profile(Profile::new("user-1")));

        let uploaded = service(&avatar_store, &profile_store)
            .process("user-1", &sample_png_base64(), "image/png")
            .await
            .unwrap();

        assert!(avatar_store.bucket_exists());
        assert_eq!(uploaded.avatar_url, format!("{BASE_URL}/user-1-L.png"));
        assert_eq!(uploaded.avatar_url_small, format!("{BASE_URL}/user-1-S.png"));
        assert_eq!(
            avatar_store.object("user-1-L.png").unwrap().content_type,
            "image/png"
        );
    }

    #[tokio::test]
    async fn test_process_ignores_failed_cleanup() {
        let avatar_store = Arc::new(InMemoryAvatarStore::new(BASE_URL).with_existing_bucket());
        avatar_store.fail_deletes();
        let profile_store =
            Arc::new(InMemoryProfileStore::new().with_profile(Profile::new("user-1")));

        let result = service(&avatar_store, &profile_store)
            .process("user-1", &sample_png_base64(), "image/png")
            .await;

        assert!(result.is_ok());
        assert_eq!(avatar_store.keys(), vec!["user-1-L.png", "user-1-S.png"]);
    }

    #[tokio::test]
    async fn test_process_rejects_bad_payload_before_touching_storage() {
        let avatar_store = Arc::new(InMemoryAvatarStore::new(BASE_URL));
        let profile_store =
            Arc::new(InMemoryProfileStore::new().with_profile(Profile::new("user-1")));

        let result = service(&avatar_store, &profile_store)
            .process("user-1", "%%%", "image/png")
            .await;

        assert!(matches!(
            result,
            Err(AvatarError::InvalidImageData(ImageError::InvalidBase64(_)))
        ));
        assert!(!avatar_store.bucket_exists());
        assert!(avatar_store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_process_keeps_uploads_when_profile_is_missing() {
        let avatar_store = Arc::new(InMemoryAvatarStore::new(BASE_URL).with_existing_bucket());
        let profile_store = Arc::new(InMemoryProfileStore::new());

        let result = service(&avatar_store, &profile_store)
            .process("ghost", &sample_png_base64(), "image/png")
            .await;

        assert!(matches!(
            result,
            Err(AvatarError::Profile(ProfileStorageError::ProfileNotFound(_)))
        ));
        // Uploaded renditions are not rolled back
        assert_eq!(avatar_store.keys(), vec!["ghost-L.png", "ghost-S.png"]);
    }

    #[tokio::test]
    async fn test_current_returns_profile() {
        let avatar_store = Arc::new(InMemoryAvatarStore::new(BASE_URL));
        let profile_store =
            Arc::new(InMemoryProfileStore::new().with_profile(Profile::new("user-1")));
        let service = service(&avatar_store, &profile_store);

        assert_eq!(
            service.current("user-1").await.unwrap().map(|p| p.id),
            Some("user-1".to_string())
        );
        assert!(service.current("user-2").await.unwrap().is_none());
    }
}
