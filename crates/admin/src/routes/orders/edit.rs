//! Order edit page handlers.
//!
//! The edit page is a plain form. The items editor keeps its rows in a
//! hidden `order_items` JSON field and asks `/edit/recalculate` for a totals
//! preview whenever a row changes. Saved totals are always recomputed here
//! from the submitted items.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::{Address, OrderId, OrderStatus, PaymentStatus, Toast};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, Order};
use crate::error::{AppError, Result, add_breadcrumb, set_sentry_order};
use crate::filters;
use crate::middleware::{Flash, push_toast};
use crate::routes::{is_htmx, toast_for_backend_error};
use crate::state::AppState;

use super::types::{ItemRow, OrderEditForm, OrderTotals};

/// Order edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/edit.html")]
pub struct OrderEditTemplate {
    pub order: Order,
    pub form: OrderEditForm,
    pub items: Vec<ItemRow>,
    pub blank_item: ItemRow,
    pub shipping: Address,
    pub billing: Address,
    pub totals: Option<OrderTotals>,
    /// Why the totals cannot be computed from the current items.
    pub error: Option<String>,
    pub statuses: &'static [OrderStatus],
    pub payment_statuses: &'static [PaymentStatus],
    pub toasts: Vec<Toast>,
}

impl OrderEditTemplate {
    fn new(order: Order, form: OrderEditForm, toasts: Vec<Toast>) -> Self {
        let (totals, error) = match form.validate_totals() {
            Ok(totals) => (Some(totals), None),
            Err(errors) => (None, Some(errors.first().to_string())),
        };
        Self {
            items: form.item_rows(),
            blank_item: ItemRow::blank(),
            shipping: form.shipping_fields(),
            billing: form.billing_fields(),
            totals,
            error,
            statuses: OrderStatus::ALL,
            payment_statuses: PaymentStatus::ALL,
            order,
            form,
            toasts,
        }
    }

    /// Whether the order currently has a billing address on the form.
    #[must_use]
    pub fn has_billing(&self) -> bool {
        !self.billing.is_blank()
    }
}

/// Totals preview fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_totals.html")]
pub struct OrderTotalsTemplate {
    pub totals: Option<OrderTotals>,
    pub error: Option<String>,
}

/// Order edit page handler.
///
/// # Errors
///
/// Returns 404 for unknown orders, or 502 if the backend fails.
#[instrument(skip(state, toasts), fields(order_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Flash(toasts): Flash,
) -> Result<impl IntoResponse> {
    set_sentry_order(&id.to_string());
    let order = state.backend().get_order(id).await?;
    let form = OrderEditForm::from_order(&order);
    Ok(OrderEditTemplate::new(order, form, toasts))
}

/// Recalculate the totals for the submitted items and amounts.
#[instrument(skip_all)]
pub async fn recalculate(Form(form): Form<OrderEditForm>) -> impl IntoResponse {
    match form.validate_totals() {
        Ok(totals) => OrderTotalsTemplate {
            totals: Some(totals),
            error: None,
        },
        Err(errors) => OrderTotalsTemplate {
            totals: None,
            error: Some(errors.first().to_string()),
        },
    }
}

/// Save the order.
///
/// Invalid input re-renders the form with the submitted values (422). A
/// backend rejection re-renders with the backend's message (422); any other
/// backend failure re-renders with the generic message (502).
///
/// # Errors
///
/// Returns 404 for unknown orders, or 502 if the order cannot be loaded.
#[instrument(skip(state, session, headers, form), fields(order_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<OrderEditForm>,
) -> Result<Response> {
    set_sentry_order(&id.to_string());
    let order = state.backend().get_order(id).await?;

    let edit = match form.validate() {
        Ok(edit) => edit,
        Err(errors) => {
            tracing::debug!(count = errors.messages().len(), "Order edit invalid");
            let toasts = vec![Toast::from_validation(&errors)];
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                OrderEditTemplate::new(order, form, toasts),
            )
                .into_response());
        }
    };

    let update = edit
        .to_update()
        .map_err(|e| AppError::Internal(format!("Failed to serialize order update: {e}")))?;

    match state.backend().update_order(id, &update).await {
        Ok(updated) => {
            tracing::info!(
                order_number = %updated.order_number,
                status = %updated.status,
                total = %updated.total_amount,
                "Order updated"
            );
            add_breadcrumb("order", &format!("Updated {}", updated.order_number));
            push_toast(
                &session,
                Toast::success(format!("Order {} updated", updated.order_number)),
            )
            .await;
            Ok(redirect_to_order(&headers, id))
        }
        Err(e) => {
            let status = if matches!(e, BackendError::Validation(_)) {
                tracing::warn!("Backend rejected order update: {e}");
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                tracing::error!("Failed to update order: {e}");
                StatusCode::BAD_GATEWAY
            };
            let toasts = vec![toast_for_backend_error(&e)];
            Ok((status, OrderEditTemplate::new(order, form, toasts)).into_response())
        }
    }
}

/// Redirect to the order page; HTMX requests get an `HX-Redirect` header.
pub(crate) fn redirect_to_order(headers: &HeaderMap, id: OrderId) -> Response {
    let location = format!("/orders/{id}");
    if is_htmx(headers)
        && let Ok(value) = HeaderValue::from_str(&location)
    {
        return (StatusCode::OK, [("hx-redirect", value)]).into_response();
    }
    Redirect::to(&location).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_to_order_plain() {
        let response = redirect_to_order(&HeaderMap::new(), OrderId::new(9));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").map(HeaderValue::as_bytes),
            Some(b"/orders/9".as_slice())
        );
    }

    #[test]
    fn test_redirect_to_order_htmx() {
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));
        let response = redirect_to_order(&headers, OrderId::new(9));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("hx-redirect").map(HeaderValue::as_bytes),
            Some(b"/orders/9".as_slice())
        );
    }
}
