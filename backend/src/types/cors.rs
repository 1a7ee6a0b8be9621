//! Cross-origin policy for browser clients

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Allowed origin value that matches any origin
const ANY_ORIGIN: &str = "*";

/// CORS settings handed to the response layer at router construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    allow_origin: String,
    allow_headers: Vec<HeaderName>,
    allow_methods: Vec<Method>,
}

impl CorsConfig {
    /// Any origin, the headers sent by the dashboard client, and the avatar endpoint methods
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            allow_origin: ANY_ORIGIN.to_string(),
            allow_headers: vec![
                header::AUTHORIZATION,
                HeaderName::from_static("x-client-info"),
                HeaderName::from_static("apikey"),
                header::CONTENT_TYPE,
            ],
            allow_methods: vec![Method::GET, Method::POST, Method::OPTIONS],
        }
    }

    /// Restricts responses to a single origin (`*` keeps it open)
    #[must_use]
    pub fn with_allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allow_origin = origin.into();
        self
    }

    /// Configured origin
    #[must_use]
    pub fn allow_origin(&self) -> &str {
        &self.allow_origin
    }

    /// Builds the `tower-http` layer for this policy
    #[must_use]
    pub fn layer(&self) -> CorsLayer {
        let allow_origin = if self.allow_origin == ANY_ORIGIN {
            AllowOrigin::any()
        } else {
            match HeaderValue::from_str(&self.allow_origin) {
                Ok(origin) => AllowOrigin::exact(origin),
                Err(e) => {
                    tracing::warn!(
                        "Invalid CORS origin {:?}, allowing any origin: {e}",
                        self.allow_origin
                    );
                    AllowOrigin::any()
                }
            }
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_headers(self.allow_headers.clone())
            .allow_methods(self.allow_methods.clone())
    }
}
