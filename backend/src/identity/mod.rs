//! Identity & Access service client
//!
//! Bearer tokens are opaque to this service. Every request asks the identity service who
//! the token belongs to; nothing is cached between requests.

mod error;

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;

pub use error::{IdentityError, IdentityResult};

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// User the bearer token belongs to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserIdentity {
    /// Opaque user id, also the primary key of the profile row
    pub id: String,
}

/// Resolves bearer tokens to users
#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync {
    /// Returns the user owning `access_token`
    async fn resolve_user(&self, access_token: &str) -> IdentityResult<UserIdentity>;
}

/// HTTP client for the Identity & Access service
pub struct IdentityApiClient {
    identity_service_url: String,
    api_key: Option<String>,
    http_client: ClientWithMiddleware,
}

impl IdentityApiClient {
    /// Creates a new identity client
    ///
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn new(identity_service_url: String, api_key: Option<String>) -> Self {
        let reqwest_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .build()
            .expect("Failed to create HTTP client");

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Self {
            identity_service_url,
            api_key,
            http_client,
        }
    }
}

#[async_trait::async_trait]
impl IdentityApi for IdentityApiClient {
    async fn resolve_user(&self, access_token: &str) -> IdentityResult<UserIdentity> {
        if access_token.is_empty() {
            return Err(IdentityError::InvalidCredential);
        }

        let url = format!("{}/auth/v1/user", self.identity_service_url);
        let mut request = self
            .http_client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"));

        if let Some(api_key) = &self.api_key {
            request = request.header("apikey", api_key);
        }

        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<UserIdentity>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::InvalidCredential)
            }
            status => Err(IdentityError::UpstreamStatus(status.as_u16())),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::HashMap;

    use super::{IdentityApi, IdentityError, IdentityResult, UserIdentity};

    /// Identity service that knows a fixed set of tokens
    #[derive(Default)]
    pub struct MockIdentityApi {
        users: HashMap<String, UserIdentity>,
    }

    impl MockIdentityApi {
        /// Creates a mock that rejects every token
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Accepts `token` as belonging to `user_id`
        #[must_use]
        pub fn with_user(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
            self.users.insert(
                token.into(),
                UserIdentity {
                    id: user_id.into(),
                },
            );
            self
        }
    }

    #[async_trait::async_trait]
    impl IdentityApi for MockIdentityApi {
        async fn resolve_user(&self, access_token: &str) -> IdentityResult<UserIdentity> {
            self.users
                .get(access_token)
                .cloned()
                .ok_or(IdentityError::InvalidCredential)
        }
    }
}
