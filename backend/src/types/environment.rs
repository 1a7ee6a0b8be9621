//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};

use super::cors::CorsConfig;

/// `LocalStack` endpoint used by every AWS client in development
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket holding avatar renditions
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set outside development
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME environment variable is not set")
            }
            Self::Development => {
                env::var("S3_BUCKET_NAME").unwrap_or_else(|_| "creatorino-avatars".to_string())
            }
        }
    }

    /// Prefix under which avatar objects are publicly readable, without a trailing slash
    ///
    /// # Panics
    ///
    /// Panics if `S3_PUBLIC_BASE_URL` is not set outside development
    #[must_use]
    pub fn s3_public_base_url(&self) -> String {
        let base_url = match self {
            Self::Production | Self::Staging => env::var("S3_PUBLIC_BASE_URL")
                .expect("S3_PUBLIC_BASE_URL environment variable is not set"),
            // LocalStack serves path-style URLs
            Self::Development => env::var("S3_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("{LOCALSTACK_ENDPOINT}/{}", self.s3_bucket())),
        };

        base_url.trim_end_matches('/').to_string()
    }

    /// Returns the Dynamo DB table name for profiles
    ///
    /// # Panics
    ///
    /// Panics if `DYNAMODB_PROFILES_TABLE_NAME` is not set outside development
    #[must_use]
    pub fn profiles_table_name(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("DYNAMODB_PROFILES_TABLE_NAME")
                .expect("DYNAMODB_PROFILES_TABLE_NAME environment variable is not set"),
            Self::Development => env::var("DYNAMODB_PROFILES_TABLE_NAME")
                .unwrap_or_else(|_| "creatorino-profiles".to_string()),
        }
    }

    /// Base URL of the Identity & Access service
    ///
    /// # Panics
    ///
    /// Panics if `IDENTITY_SERVICE_URL` is not set outside development
    #[must_use]
    pub fn identity_service_url(&self) -> String {
        let url = match self {
            Self::Production | Self::Staging => env::var("IDENTITY_SERVICE_URL")
                .expect("IDENTITY_SERVICE_URL environment variable is not set"),
            Self::Development => env::var("IDENTITY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
        };

        url.trim_end_matches('/').to_string()
    }

    /// Optional `apikey` header value sent to the Identity & Access service
    #[must_use]
    pub fn identity_api_key(&self) -> Option<String> {
        env::var("IDENTITY_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// CORS policy applied to every response
    #[must_use]
    pub fn cors_config(&self) -> CorsConfig {
        env::var("CORS_ALLOW_ORIGIN")
            .ok()
            .filter(|origin| !origin.trim().is_empty())
            .map_or_else(CorsConfig::permissive, |origin| {
                CorsConfig::permissive().with_allow_origin(origin.trim())
            })
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development => Some(LOCALSTACK_ENDPOINT),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // LocalStack only resolves path-style bucket addressing
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_environment_from_env() {
        env::remove_var("APP_ENV");
        assert_eq!(Environment::from_env(), Environment::Development);

        env::set_var("APP_ENV", " Staging ");
        assert_eq!(Environment::from_env(), Environment::Staging);

        env::set_var("APP_ENV", "production");
        assert_eq!(Environment::from_env(), Environment::Production);

        env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "Invalid environment: invalid")]
    fn test_invalid_environment() {
        env::set_var("APP_ENV", "invalid");
        let _ = Environment::from_env();
    }

    #[test]
    #[serial]
    fn test_development_defaults() {
        env::remove_var("S3_BUCKET_NAME");
        env::remove_var("S3_PUBLIC_BASE_URL");
        env::remove_var("DYNAMODB_PROFILES_TABLE_NAME");
        env::remove_var("IDENTITY_SERVICE_URL");
        env::remove_var("IDENTITY_API_KEY");

        let env = Environment::Development;
        assert_eq!(env.s3_bucket(), "creatorino-avatars");
        assert_eq!(
            env.s3_public_base_url(),
            "http://localhost:4566/creatorino-avatars"
        );
        assert_eq!(env.profiles_table_name(), "creatorino-profiles");
        assert_eq!(env.identity_service_url(), "http://localhost:54321");
        assert_eq!(env.identity_api_key(), None);
        assert_eq!(env.override_aws_endpoint_url(), Some(LOCALSTACK_ENDPOINT));
    }

    #[test]
    #[serial]
    fn test_public_base_url_follows_bucket_override() {
        env::remove_var("S3_PUBLIC_BASE_URL");
        env::set_var("S3_BUCKET_NAME", "custom-bucket");

        assert_eq!(
            Environment::Development.s3_public_base_url(),
            "http://localhost:4566/custom-bucket"
        );

        env::set_var("S3_PUBLIC_BASE_URL", "https://cdn.creatorino.app/avatars/");
        assert_eq!(
            Environment::Development.s3_public_base_url(),
            "https://cdn.creatorino.app/avatars"
        );

        env::remove_var("S3_BUCKET_NAME");
        env::remove_var("S3_PUBLIC_BASE_URL");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "S3_BUCKET_NAME environment variable is not set")]
    fn test_production_requires_bucket() {
        env::remove_var("S3_BUCKET_NAME");
        let _ = Environment::Production.s3_bucket();
    }

    #[test]
    #[serial]
    fn test_blank_identity_api_key_is_ignored() {
        env::set_var("IDENTITY_API_KEY", "  ");
        assert_eq!(Environment::Development.identity_api_key(), None);

        env::set_var("IDENTITY_API_KEY", "anon-key");
        assert_eq!(
            Environment::Development.identity_api_key(),
            Some("anon-key".to_string())
        );

        env::remove_var("IDENTITY_API_KEY");
    }

    #[test]
    fn test_show_api_docs() {
        assert!(Environment::Development.show_api_docs());
        assert!(Environment::Staging.show_api_docs());
        assert!(!Environment::Production.show_api_docs());
    }
}
