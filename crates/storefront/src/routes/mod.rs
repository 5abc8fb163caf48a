//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (backend reachable)
//!
//! # Products
//! GET  /products                  - Product listing (HTMX: grid fragment)
//! GET  /products/{slug}           - Product detail
//!
//! # Cart (HTMX fragments)
//! GET    /cart                    - Cart page
//! POST   /cart/items              - Add to cart
//! PUT    /cart/items/{id}         - Update quantity (returns cart_items fragment)
//! DELETE /cart/items/{id}         - Remove line (returns cart_items fragment)
//! POST   /cart/coupon             - Apply coupon code
//! GET    /cart/count              - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                  - Review cart and enter details
//! GET  /checkout/guest            - Guest contact step
//! POST /checkout/guest            - Store guest contact
//! GET  /checkout/details          - Address, coupon and notes step
//! POST /checkout/details          - Create checkout session, redirect to payment
//! GET  /checkout/sessions/{id}    - Checkout session summary
//! GET  /checkout/success          - Payment completed
//! GET  /checkout/cancel           - Payment abandoned
//!
//! # Pages
//! GET  /about, /contact, /faq, /privacy, /terms, /shipping, /returns
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post, put},
};
use emporium_core::{Toast, ValidationErrors};

use crate::backend::BackendError;
use crate::middleware::{cart_rate_limiter, checkout_rate_limiter};
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

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/items", post(cart::add))
        .route("/items/{id}", put(cart::update).delete(cart::remove))
        .route("/coupon", post(cart::apply_coupon))
        .route_layer(cart_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    let submissions = Router::new()
        .route("/guest", post(checkout::guest_submit))
        .route("/details", post(checkout::submit))
        .route_layer(checkout_rate_limiter());

    Router::new()
        .route("/", get(checkout::index))
        .route("/guest", get(checkout::guest_index))
        .route("/details", get(checkout::details))
        .route("/sessions/{id}", get(checkout::show))
        .route("/success", get(checkout::success))
        .route("/cancel", get(checkout::cancel))
        .merge(submissions)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .merge(pages::router())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }

    #[test]
    fn test_toast_for_backend_error() {
        let toast = toast_for_backend_error(&BackendError::Validation(vec![
            "Only 2 left in stock".to_string(),
            "Second".to_string(),
        ]));
        assert_eq!(toast.message, "Only 2 left in stock");

        let toast = toast_for_backend_error(&BackendError::Parse("eof".to_string()));
        assert_eq!(toast.message, emporium_core::toast::GENERIC_FAILURE);
    }
}
