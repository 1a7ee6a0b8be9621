//! These tests run against `LocalStack` on `localhost:4566`.
//! Run them with `cargo test -p profile_storage -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use pretty_assertions::assert_eq;
use profile_storage::{Profile, ProfileAttribute, ProfileStorage, ProfileStorageError};
use uuid::Uuid;

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// Test context that drops its table on teardown
struct TestContext {
    storage: ProfileStorage,
    table_name: String,
    dynamodb_client: Arc<DynamoDbClient>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

async fn setup_test() -> TestContext {
    let table_name = format!("test-profiles-{}", Uuid::new_v4());

    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    let dynamodb_client = Arc::new(DynamoDbClient::new(&config));

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(ProfileAttribute::Id.to_string())
                .attribute_type(ScalarAttributeType::S)
                .build()
                .unwrap(),
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(ProfileAttribute::Id.to_string())
                .key_type(KeyType::Hash)
                .build()
                .unwrap(),
        )
        .billing_mode(aws_sdk_dynamodb::types::BillingMode::PayPerRequest)
        .send()
        .await
        .expect("Failed to create test table");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let storage = ProfileStorage::new(dynamodb_client.clone(), table_name.clone());

    TestContext {
        storage,
        table_name,
        dynamodb_client,
    }
}

fn test_profile() -> Profile {
    let mut profile = Profile::new(format!("user-{}", Uuid::new_v4()));
    profile.attributes.insert(
        "display_name".to_string(),
        serde_json::Value::String("Test Creator".to_string()),
    );
    profile
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_update_avatar_urls() {
    let context = setup_test().await;
    let profile = test_profile();

    context
        .storage
        .insert(&profile)
        .await
        .expect("Failed to insert profile");

    let updated = context
        .storage
        .update_avatar_urls(&profile.id, "https://cdn/large.png", "https://cdn/small.png")
        .await
        .expect("Failed to update avatar urls");

    assert_eq!(updated.id, profile.id);
    assert_eq!(updated.avatar_url.as_deref(), Some("https://cdn/large.png"));
    assert_eq!(
        updated.avatar_url_small.as_deref(),
        Some("https://cdn/small.png")
    );
    assert!(updated.updated_at.is_some());
    assert_eq!(
        updated.attributes.get("display_name"),
        profile.attributes.get("display_name")
    );

    let stored = context
        .storage
        .get_by_id(&profile.id)
        .await
        .expect("Failed to get profile")
        .expect("Profile should exist");
    assert_eq!(stored, updated);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_update_avatar_urls_never_creates_profile() {
    let context = setup_test().await;

    let result = context
        .storage
        .update_avatar_urls("missing-user", "https://cdn/l.png", "https://cdn/s.png")
        .await;
    assert!(matches!(
        result,
        Err(ProfileStorageError::ProfileNotFound(ref id)) if id == "missing-user"
    ));

    let stored = context
        .storage
        .get_by_id("missing-user")
        .await
        .expect("Failed to get profile");
    assert!(stored.is_none());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_insert_duplicate_prevention() {
    let context = setup_test().await;
    let profile = test_profile();

    context
        .storage
        .insert(&profile)
        .await
        .expect("First insert should succeed");

    let result = context.storage.insert(&profile).await;
    assert!(matches!(result, Err(ProfileStorageError::ProfileExists)));
}
