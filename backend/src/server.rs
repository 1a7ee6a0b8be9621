use std::sync::Arc;
use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{extract::DefaultBodyLimit, middleware, Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::{
    avatar::AvatarService, identity::IdentityApi, middleware::add_client_info_to_span, routes,
    types::Environment,
};

/// Largest accepted request body, base64 inflates images by a third
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Time budget of a single request, image rendering included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the application router with all layers applied
///
/// The CORS layer wraps everything else, so error responses and timeouts carry CORS
/// headers too.
pub fn router(
    environment: Environment,
    avatar_service: Arc<AvatarService>,
    identity_api: Arc<dyn IdentityApi>,
) -> Router {
    let mut openapi = OpenApi::default();
    let cors = environment.cors_config().layer();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(avatar_service))
        .layer(Extension(identity_api))
        .layer(middleware::from_fn(add_client_info_to_span))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors)
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    avatar_service: Arc<AvatarService>,
    identity_api: Arc<dyn IdentityApi>,
) -> anyhow::Result<()> {
    let router = router(environment, avatar_service, identity_api);

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Creatorino avatar service started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
