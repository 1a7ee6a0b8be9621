use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use creatorino_backend::{
    avatar::AvatarService, avatar_storage::memory::InMemoryAvatarStore,
    identity::mock::MockIdentityApi, profiles::memory::InMemoryProfileStore, server,
    types::Environment,
};
use profile_storage::Profile;
use tower::ServiceExt;

/// Token accepted by the mock identity service
pub const VALID_TOKEN: &str = "valid-access-token";
/// User the valid token belongs to
pub const USER_ID: &str = "3f9a2c1e-creator";
/// Public base URL of the in-memory bucket
pub const PUBLIC_BASE_URL: &str = "https://cdn.creatorino.test/avatars";
/// Origin sent with every request
pub const ORIGIN: &str = "https://dashboard.creatorino.test";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Full application router backed by in-memory stores
pub struct TestSetup {
    pub router: Router,
    pub avatar_store: Arc<InMemoryAvatarStore>,
    pub profile_store: Arc<InMemoryProfileStore>,
}

impl TestSetup {
    /// Bucket missing, one profile row for [`USER_ID`]
    pub fn new() -> Self {
        Self::with_stores(
            InMemoryAvatarStore::new(PUBLIC_BASE_URL),
            InMemoryProfileStore::new().with_profile(Profile::new(USER_ID)),
        )
    }

    pub fn with_stores(
        avatar_store: InMemoryAvatarStore,
        profile_store: InMemoryProfileStore,
    ) -> Self {
        setup_test_env();

        let avatar_store = Arc::new(avatar_store);
        let profile_store = Arc::new(profile_store);
        let avatar_service = Arc::new(AvatarService::new(
            avatar_store.clone(),
            profile_store.clone(),
        ));
        let identity_api = Arc::new(MockIdentityApi::new().with_user(VALID_TOKEN, USER_ID));

        let router = server::router(Environment::Development, avatar_service, identity_api);

        Self {
            router,
            avatar_store,
            profile_store,
        }
    }

    pub async fn send_request(
        &self,
        request: Request<Body>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Authenticated JSON POST
    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_raw_post_request(route, payload.to_string(), Some(VALID_TOKEN))
            .await
    }

    /// POST with an arbitrary body and optional bearer token
    pub async fn send_raw_post_request(
        &self,
        route: &str,
        body: String,
        token: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Origin", ORIGIN)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        self.send_request(builder.body(Body::from(body))?).await
    }

    /// GET with an optional bearer token
    pub async fn send_get_request(
        &self,
        route: &str,
        token: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("GET")
            .header("Origin", ORIGIN);

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        self.send_request(builder.body(Body::empty())?).await
    }
}
