use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;

use creatorino_backend::{
    avatar::AvatarService, avatar_storage::S3AvatarStore, identity::IdentityApiClient, server,
    types::Environment,
};
use profile_storage::ProfileStorage;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let avatar_store = Arc::new(S3AvatarStore::new(
        s3_client,
        environment.s3_bucket(),
        environment.s3_public_base_url(),
    ));

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let profile_store = Arc::new(ProfileStorage::new(
        dynamodb_client,
        environment.profiles_table_name(),
    ));

    let avatar_service = Arc::new(AvatarService::new(avatar_store, profile_store));
    let identity_api = Arc::new(IdentityApiClient::new(
        environment.identity_service_url(),
        environment.identity_api_key(),
    ));

    server::start(environment, avatar_service, identity_api).await
}
