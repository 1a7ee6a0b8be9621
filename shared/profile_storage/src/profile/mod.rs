//! Profile storage integration using Dynamo DB
//!
//! Profile rows are created by the account flow; the avatar service only reads them and
//! rewrites their avatar columns. [`ProfileStorage::insert`] seeds rows for fixtures.

mod error;

use std::collections::BTreeMap;
use std::sync::Arc;

use aws_sdk_dynamodb::{
    error::SdkError,
    types::{AttributeValue, ReturnValue},
    Client as DynamoDbClient,
};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

pub use error::{ProfileStorageError, ProfileStorageResult};

/// Attribute names for the profiles table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProfileAttribute {
    /// User id (Primary Key)
    Id,
    /// Public URL of the 400x400 avatar
    AvatarUrl,
    /// Public URL of the 80x80 avatar
    AvatarUrlSmall,
    /// RFC 3339 timestamp of the last mutation
    UpdatedAt,
}

/// Profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    /// User id (Primary Key)
    pub id: String,
    /// Public URL of the large avatar
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Public URL of the small avatar
    #[serde(default)]
    pub avatar_url_small: Option<String>,
    /// RFC 3339 timestamp of the last mutation
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Remaining columns of the row, passed through untouched
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Profile {
    /// Creates an empty profile for the given user id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            avatar_url: None,
            avatar_url_small: None,
            updated_at: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// Profile storage client for Dynamo DB operations
pub struct ProfileStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl ProfileStorage {
    /// Creates a new profile storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for profiles
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Inserts a new profile
    ///
    /// The avatar service never creates profile rows; this seeds rows for fixtures and
    /// local setups where the account flow is not running.
    ///
    /// # Errors
    ///
    /// Returns `ProfileStorageError::ProfileExists` if a row with the same id exists,
    /// or another `ProfileStorageError` if the Dynamo DB operation fails
    pub async fn insert(&self, profile: &Profile) -> ProfileStorageResult<()> {
        let item = serde_dynamo::to_item(profile)
            .map_err(|e| ProfileStorageError::SerializationError(e.to_string()))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", ProfileAttribute::Id.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    ProfileStorageError::ProfileExists
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    /// Gets a profile by user id
    ///
    /// # Errors
    ///
    /// Returns `ProfileStorageError` if the Dynamo DB operation fails
    pub async fn get_by_id(&self, profile_id: &str) -> ProfileStorageResult<Option<Profile>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                ProfileAttribute::Id.to_string(),
                AttributeValue::S(profile_id.to_string()),
            )
            .send()
            .await?;

        let item = response
            .item()
            .map(|item| serde_dynamo::from_item(item.clone()))
            .transpose()
            .map_err(|e| ProfileStorageError::SerializationError(e.to_string()))?;

        Ok(item)
    }

    /// Points the avatar columns of an existing profile at new URLs and stamps `updated_at`
    ///
    /// The row must already exist; this never creates a profile.
    ///
    /// # Returns
    ///
    /// The full profile row after the update
    ///
    /// # Errors
    ///
    /// Returns `ProfileStorageError::ProfileNotFound` if no row exists for `profile_id`,
    /// or another `ProfileStorageError` if the Dynamo DB operation fails
    pub async fn update_avatar_urls(
        &self,
        profile_id: &str,
        avatar_url: &str,
        avatar_url_small: &str,
    ) -> ProfileStorageResult<Profile> {
        let response = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(
                ProfileAttribute::Id.to_string(),
                AttributeValue::S(profile_id.to_string()),
            )
            .update_expression(
                "SET #avatar_url = :avatar_url, #avatar_url_small = :avatar_url_small, #updated_at = :updated_at",
            )
            .condition_expression("attribute_exists(#pk)")
            .expression_attribute_names("#pk", ProfileAttribute::Id.to_string())
            .expression_attribute_names("#avatar_url", ProfileAttribute::AvatarUrl.to_string())
            .expression_attribute_values(":avatar_url", AttributeValue::S(avatar_url.to_string()))
            .expression_attribute_names(
                "#avatar_url_small",
                ProfileAttribute::AvatarUrlSmall.to_string(),
            )
            .expression_attribute_values(
                ":avatar_url_small",
                AttributeValue::S(avatar_url_small.to_string()),
            )
            .expression_attribute_names("#updated_at", ProfileAttribute::UpdatedAt.to_string())
            .expression_attribute_values(":updated_at", AttributeValue::S(Utc::now().to_rfc3339()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    tracing::warn!("Profile {profile_id} does not exist, avatar URLs not updated");
                    ProfileStorageError::ProfileNotFound(profile_id.to_string())
                } else {
                    err.into()
                }
            })?;

        let attributes = response.attributes().ok_or_else(|| {
            ProfileStorageError::SerializationError("update returned no attributes".to_string())
        })?;

        serde_dynamo::from_item(attributes.clone())
            .map_err(|e| ProfileStorageError::SerializationError(e.to_string()))
    }
}
