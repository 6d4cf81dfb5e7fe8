//! Request ID middleware for request tracing and correlation.
//!
//! An upstream `x-request-id` is reused; otherwise a UUID v4 is minted. The
//! id lands in the request span, the Sentry scope, the request extensions
//! (for handlers) and the response headers.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Request as HttpRequest},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id, available to handlers via `Extension<RequestId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Span for `TraceLayer`, with an empty `request_id` for the middleware to fill.
pub fn make_request_span(request: &HttpRequest<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

/// Ensure every request carries a request id.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let header = HeaderValue::from_str(&request_id).ok();
    request.extensions_mut().insert(RequestId(request_id));

    let mut response = next.run(request).await;

    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
