//! Request ID middleware shared by the storefront and admin apps.
//!
//! Reuses an upstream `x-request-id` when it looks sane, otherwise mints a
//! UUID v4. The ID lands on the request span, the Sentry scope and the
//! response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID that is passed through.
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// The upstream ID if usable, otherwise a fresh UUID v4.
#[must_use]
pub fn request_id_from(upstream: Option<&str>) -> String {
    upstream
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LENGTH)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id_from(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok()),
    );

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware::from_fn, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn(request_id_middleware))
    }

    async fn echoed(upstream: Option<&str>) -> String {
        let mut request = Request::builder().uri("/");
        if let Some(id) = upstream {
            request = request.header(REQUEST_ID_HEADER, id);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_request_id_from() {
        assert_eq!(request_id_from(Some("req-42")), "req-42");
        assert_eq!(request_id_from(None).len(), 36);
        assert_eq!(request_id_from(Some("")).len(), 36);
        assert_ne!(request_id_from(Some(&"x".repeat(129))), "x".repeat(129));
    }

    #[tokio::test]
    async fn test_middleware_echoes_request_id() {
        assert_eq!(echoed(Some("req-42")).await, "req-42");
        assert!(Uuid::parse_str(&echoed(None).await).is_ok());
    }
}
