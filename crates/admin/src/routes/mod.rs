//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET   /                               - Redirect to /orders
//! GET   /health                         - Liveness check
//! GET   /health/ready                   - Readiness check (backend reachable)
//!
//! # Orders
//! GET   /orders                         - Order list (HTMX: table fragment)
//! GET   /orders/{id}                    - Order detail
//! GET   /orders/{id}/edit               - Edit form
//! POST  /orders/{id}/edit/recalculate   - Totals preview (fragment)
//! PATCH /orders/{id}                    - Save edits (HTMX)
//! POST  /orders/{id}                    - Save edits (plain form)
//! GET   /orders/{id}/ship               - Ship form
//! POST  /orders/{id}/ship               - Create shipment
//! ```

pub mod orders;

use axum::{
    Router,
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
};
use emporium_core::{Toast, ValidationErrors};

use crate::backend::BackendError;
use crate::state::AppState;

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

/// Toast for a failed backend call.
///
/// Rejected input shows the backend's first message; anything else shows
/// the generic failure message.
#[must_use]
pub fn toast_for_backend_error(error: &BackendError) -> Toast {
    match error {
        BackendError::Validation(messages) => {
            Toast::from_validation(&ValidationErrors::new(messages.clone()))
        }
        _ => Toast::generic_failure(),
    }
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route(
            "/{id}",
            get(orders::show).patch(orders::update).post(orders::update),
        )
        .route("/{id}/edit", get(orders::edit))
        .route("/{id}/edit/recalculate", post(orders::recalculate))
        .route("/{id}/ship", get(orders::ship_form).post(orders::ship))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/orders") }))
        .nest("/orders", order_routes())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("false"));
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }

    #[test]
    fn test_toast_for_backend_error() {
        let toast = toast_for_backend_error(&BackendError::Validation(vec![
            "Weight exceeds the carrier limit.".to_string(),
        ]));
        assert_eq!(toast.message, "Weight exceeds the carrier limit.");

        let toast = toast_for_backend_error(&BackendError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(toast.message, emporium_core::toast::GENERIC_FAILURE);
    }
}
