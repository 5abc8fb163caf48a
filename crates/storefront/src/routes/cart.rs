//! Cart route handlers.
//!
//! Quantity changes and removals are HTMX requests that return the cart
//! items fragment. The cart token issued by the backend is kept in the
//! session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use emporium_core::{CartItemId, ProductId, Toast, ToastKind, ValidationErrors, Validator};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, Cart};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{Flash, push_toast};
use crate::models::session_keys;
use crate::routes::{is_htmx, toast_for_backend_error};
use crate::state::AppState;

/// Longest coupon code the backend accepts.
pub const MAX_COUPON_LENGTH: usize = 32;

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart token from the session.
pub async fn cart_token(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::CART_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Remember the cart token returned by the backend.
async fn remember_cart_token(session: &Session, cart: &Cart) {
    if let Some(token) = &cart.token
        && let Err(e) = session.insert(session_keys::CART_TOKEN, token).await
    {
        tracing::error!("Failed to save cart token to session: {e}");
    }
}

/// Forget the cart, e.g. after a completed checkout.
pub async fn clear_cart_token(session: &Session) {
    if let Err(e) = session.remove_value(session_keys::CART_TOKEN).await {
        tracing::warn!("Failed to clear cart token: {e}");
    }
}

/// Load the shopper's cart, falling back to an empty cart.
///
/// A token the backend no longer recognizes is dropped from the session.
pub async fn load_cart(state: &AppState, session: &Session) -> Cart {
    let Some(token) = cart_token(session).await else {
        return Cart::default();
    };

    match state.backend().get_cart(&token).await {
        Ok(cart) => cart,
        Err(BackendError::NotFound(_)) => {
            tracing::info!("Cart token expired, starting a new cart");
            clear_cart_token(session).await;
            Cart::default()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            Cart::default()
        }
    }
}

/// Check a coupon code's format.
pub fn validate_coupon_code(v: &mut Validator, code: &str) {
    let code = code.trim();
    if code.is_empty() {
        return;
    }
    v.check(
        code.len() <= MAX_COUPON_LENGTH
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
        "Coupon code may only contain letters, numbers, dashes and underscores",
    );
}

/// Parse a submitted quantity, which must be a whole number of at least 1.
fn parse_quantity(raw: &str) -> Result<u32, ValidationErrors> {
    let mut v = Validator::new();
    let quantity = v.quantity("Quantity", raw, 1);
    v.finish()?;
    quantity.ok_or_else(|| ValidationErrors::single("Quantity is invalid"))
}

/// Units to remove: between 1 and what the line holds.
fn parse_removal(raw: &str, line_quantity: u32) -> Result<u32, ValidationErrors> {
    let mut v = Validator::new();
    let quantity = v.quantity("Quantity", raw, 1);
    if let Some(quantity) = quantity {
        v.check(
            quantity <= line_quantity,
            format!("Only {line_quantity} of this item is in your cart"),
        );
    }
    v.finish()?;
    quantity.ok_or_else(|| ValidationErrors::single("Quantity is invalid"))
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<String>,
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    #[serde(default)]
    pub quantity: String,
}

/// Query parameters of a removal request.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveFromCartQuery {
    /// Units being removed; defaults to the whole line.
    #[serde(default)]
    pub quantity: Option<String>,
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: Cart,
    pub toasts: Vec<Toast>,
}

/// Cart items fragment template (for HTMX).
///
/// Toasts are swapped out-of-band into the page's toast region.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: Cart,
    pub toasts: Vec<Toast>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn items_fragment(cart: Cart, toast: Option<Toast>) -> Response {
    let changed = toast.as_ref().is_none_or(|t| t.kind != ToastKind::Error);
    let fragment = CartItemsTemplate {
        cart,
        toasts: toast.into_iter().collect(),
    };
    if changed {
        (AppendHeaders([("HX-Trigger", "cart-updated")]), fragment).into_response()
    } else {
        fragment.into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, toasts))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Flash(toasts): Flash,
) -> impl IntoResponse {
    CartShowTemplate {
        cart: load_cart(&state, &session).await,
        toasts,
    }
}

/// Add a product to the cart.
///
/// Creates the cart on the backend when the session has no token yet.
/// HTMX requests get the count badge back; plain form posts are redirected
/// to the cart page.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let toast = match parse_quantity(form.quantity.as_deref().unwrap_or("1")) {
        Ok(quantity) => {
            let token = cart_token(&session).await;
            match state
                .backend()
                .add_cart_item(token.as_deref(), form.product_id, quantity)
                .await
            {
                Ok(cart) => {
                    remember_cart_token(&session, &cart).await;
                    let product_id = form.product_id.to_string();
                    add_breadcrumb(
                        "cart",
                        "Added item",
                        Some(&[("product_id", product_id.as_str())]),
                    );

                    if is_htmx(&headers) {
                        return (
                            AppendHeaders([("HX-Trigger", "cart-updated")]),
                            CartCountTemplate {
                                count: cart.item_count(),
                            },
                        )
                            .into_response();
                    }
                    Toast::success("Added to your cart")
                }
                Err(e) => {
                    tracing::error!("Failed to add item to cart: {e}");
                    toast_for_backend_error(&e)
                }
            }
        }
        Err(errors) => Toast::from_validation(&errors),
    };

    push_toast(&session, toast).await;
    Redirect::to("/cart").into_response()
}

/// Update a cart line's quantity (HTMX).
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<CartItemId>,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return items_fragment(Cart::default(), None);
    };

    let quantity = match parse_quantity(&form.quantity) {
        Ok(quantity) => quantity,
        Err(errors) => {
            return items_fragment(
                load_cart(&state, &session).await,
                Some(Toast::from_validation(&errors)),
            );
        }
    };

    match state
        .backend()
        .update_cart_item(&token, item_id, quantity)
        .await
    {
        Ok(cart) => items_fragment(cart, None),
        Err(e) => {
            tracing::error!("Failed to update cart: {e}");
            items_fragment(
                load_cart(&state, &session).await,
                Some(toast_for_backend_error(&e)),
            )
        }
    }
}

/// Remove a cart line (HTMX).
///
/// The backend expects the number of units being removed; when the request
/// does not say, the whole line is removed. A count outside `1..=line`
/// re-renders the cart with a toast and is not sent.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<CartItemId>,
    Query(query): Query<RemoveFromCartQuery>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return items_fragment(Cart::default(), None);
    };

    let cart = load_cart(&state, &session).await;
    let Some(line_quantity) = cart.item(item_id).map(|item| item.quantity) else {
        return items_fragment(cart, None);
    };

    let quantity = match query.quantity.as_deref() {
        Some(raw) => match parse_removal(raw, line_quantity) {
            Ok(quantity) => quantity,
            Err(errors) => return items_fragment(cart, Some(Toast::from_validation(&errors))),
        },
        None => line_quantity,
    };

    match state
        .backend()
        .remove_cart_item(&token, item_id, quantity)
        .await
    {
        Ok(cart) => items_fragment(cart, Some(Toast::info("Item removed from your cart"))),
        Err(e) => {
            tracing::error!("Failed to remove from cart: {e}");
            items_fragment(
                load_cart(&state, &session).await,
                Some(toast_for_backend_error(&e)),
            )
        }
    }
}

/// Apply a coupon code to the cart.
#[instrument(skip(state, session, form))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CouponForm>,
) -> Redirect {
    let mut v = Validator::new();
    if v.required("Coupon code", &form.code) {
        validate_coupon_code(&mut v, &form.code);
    }

    let toast = if let Err(errors) = v.finish() {
        Toast::from_validation(&errors)
    } else if let Some(token) = cart_token(&session).await {
        let code = form.code.trim();
        match state.backend().apply_coupon(&token, code).await {
            Ok(_) => Toast::success(format!("Coupon {code} applied")),
            Err(e) => {
                tracing::warn!("Coupon rejected: {e}");
                toast_for_backend_error(&e)
            }
        }
    } else {
        Toast::warning("Your cart is empty")
    };

    push_toast(&session, toast).await;
    Redirect::to("/cart")
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&state, &session).await.item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn coupon_errors(code: &str) -> Vec<String> {
        let mut v = Validator::new();
        validate_coupon_code(&mut v, code);
        v.finish()
            .err()
            .map(|e| e.messages().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("2").unwrap(), 2);
        assert_eq!(
            parse_quantity("0").unwrap_err().first(),
            "Quantity must be at least 1"
        );
        assert!(parse_quantity("-3").is_err());
        assert!(parse_quantity("").is_err());
    }

    #[test]
    fn test_parse_removal_is_bounded_by_line() {
        assert_eq!(parse_removal("1", 2).unwrap(), 1);
        assert_eq!(parse_removal("2", 2).unwrap(), 2);
        assert_eq!(
            parse_removal("0", 2).unwrap_err().first(),
            "Quantity must be at least 1"
        );
        assert_eq!(
            parse_removal("3", 2).unwrap_err().first(),
            "Only 2 of this item is in your cart"
        );
        assert!(parse_removal("lots", 2).is_err());
    }

    #[test]
    fn test_coupon_code_format() {
        assert!(coupon_errors("SPRING-25").is_empty());
        assert!(coupon_errors("summer_sale").is_empty());
        assert!(coupon_errors("").is_empty());
        assert_eq!(coupon_errors("50% OFF").len(), 1);
        assert_eq!(coupon_errors(&"A".repeat(33)).len(), 1);
    }
}
