//! Error types for profile storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    get_item::GetItemError, put_item::PutItemError, update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type for profile storage operations
pub type ProfileStorageResult<T> = Result<T, ProfileStorageError>;

/// Errors that can occur during profile storage operations
#[derive(Error, Debug)]
pub enum ProfileStorageError {
    /// Failed to insert profile into Dynamo DB
    #[error("Failed to insert profile into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get profile from Dynamo DB
    #[error("Failed to get profile from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to update profile in Dynamo DB
    #[error("Failed to update profile in DynamoDB: {0}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Profile already exists, returned when seeding a row twice
    #[error("Profile already exists")]
    ProfileExists,

    /// No profile row exists for the given id
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
