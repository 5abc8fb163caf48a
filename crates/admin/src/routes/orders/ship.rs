//! Ship order page handlers.
//!
//! The ship form is prefilled from the configured sender address and the
//! order's customer and shipping address. Submitting it creates a shipment
//! (buys a label) through the backend.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::{OrderId, Toast};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, DimensionUnit, Order, ServiceLevel, WeightUnit};
use crate::error::{Result, add_breadcrumb, set_sentry_order};
use crate::filters;
use crate::middleware::{Flash, push_toast};
use crate::routes::toast_for_backend_error;
use crate::state::AppState;

use super::edit::redirect_to_order;
use super::types::ShipForm;

/// Ship order page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/ship.html")]
pub struct OrderShipTemplate {
    pub order: Order,
    pub form: ShipForm,
    pub weight_units: &'static [WeightUnit],
    pub dimension_units: &'static [DimensionUnit],
    pub service_levels: &'static [ServiceLevel],
    pub toasts: Vec<Toast>,
}

impl OrderShipTemplate {
    fn new(order: Order, form: ShipForm, toasts: Vec<Toast>) -> Self {
        Self {
            order,
            form,
            weight_units: WeightUnit::ALL,
            dimension_units: DimensionUnit::ALL,
            service_levels: ServiceLevel::ALL,
            toasts,
        }
    }
}

/// Send orders that cannot be shipped back to their page.
async fn redirect_unshippable(session: &Session, order: &Order) -> Response {
    push_toast(
        session,
        Toast::error(format!(
            "Order {} is {} and cannot be shipped",
            order.order_number,
            order.status.label().to_lowercase()
        )),
    )
    .await;
    Redirect::to(&format!("/orders/{}", order.id)).into_response()
}

/// Ship order page handler.
///
/// # Errors
///
/// Returns 404 for unknown orders, or 502 if the backend fails.
#[instrument(skip(state, session, toasts), fields(order_id = %id))]
pub async fn ship_form(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    session: Session,
    Flash(toasts): Flash,
) -> Result<Response> {
    set_sentry_order(&id.to_string());
    let order = state.backend().get_order(id).await?;
    if !order.can_ship() {
        return Ok(redirect_unshippable(&session, &order).await);
    }

    let form = ShipForm::prefill(&order, &state.config().ship_from);
    Ok(OrderShipTemplate::new(order, form, toasts).into_response())
}

/// Create a shipment for the order.
///
/// Invalid input re-renders the form with the submitted values (422). A
/// backend or carrier rejection re-renders with its message (422); any
/// other backend failure re-renders with the generic message (502).
///
/// # Errors
///
/// Returns 404 for unknown orders, or 502 if the order cannot be loaded.
#[instrument(skip(state, session, headers, fields), fields(order_id = %id))]
pub async fn ship(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    session: Session,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response> {
    set_sentry_order(&id.to_string());
    let order = state.backend().get_order(id).await?;
    if !order.can_ship() {
        return Ok(redirect_unshippable(&session, &order).await);
    }

    let form = ShipForm::from_fields(&fields);
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(count = errors.messages().len(), "Ship form invalid");
            let toasts = vec![Toast::from_validation(&errors)];
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                OrderShipTemplate::new(order, form, toasts),
            )
                .into_response());
        }
    };

    match state.backend().create_shipment(id, &request).await {
        Ok(shipment) => {
            tracing::info!(
                order_number = %order.order_number,
                tracking_number = %shipment.tracking_number,
                carrier = shipment.carrier.as_deref().unwrap_or("unknown"),
                "Shipment created"
            );
            add_breadcrumb(
                "shipment",
                &format!("Label created for {}", order.order_number),
            );
            push_toast(
                &session,
                Toast::success(format!(
                    "Shipment created for order {}. Tracking number: {}",
                    order.order_number, shipment.tracking_number
                )),
            )
            .await;
            Ok(redirect_to_order(&headers, id))
        }
        Err(e) => {
            let status = if matches!(e, BackendError::Validation(_)) {
                tracing::warn!("Backend rejected shipment: {e}");
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                tracing::error!("Failed to create shipment: {e}");
                StatusCode::BAD_GATEWAY
            };
            let toasts = vec![toast_for_backend_error(&e)];
            Ok((status, OrderShipTemplate::new(order, form, toasts)).into_response())
        }
    }
}
