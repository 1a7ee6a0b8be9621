use axum::{extract::Request, middleware::Next, response::Response};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::{Context, KeyValue};

/// Client metadata headers recorded on the trace span
const CLIENT_INFO_HEADERS: [&str; 2] = ["x-client-info", "user-agent"];

/// Records which client build issued the request on the current trace span.
///
/// Browser SDKs identify themselves through `x-client-info`. No user identifying headers
/// are recorded.
pub async fn add_client_info_to_span(request: Request, next: Next) -> Response {
    {
        // Get the OpenTelemetry context directly (bypasses tracing's Span::current())
        let cx = Context::current();
        let span = cx.span();

        for header in CLIENT_INFO_HEADERS {
            if let Some(value) = request.headers().get(header).and_then(|v| v.to_str().ok()) {
                span.set_attribute(KeyValue::new(
                    format!("http.request.headers.{header}"),
                    value.to_owned(),
                ));
            }
        }
    }

    next.run(request).await
}
