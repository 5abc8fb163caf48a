//! Order detail page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use emporium_core::{OrderId, Toast};
use tracing::instrument;

use crate::backend::Order;
use crate::error::{Result, set_sentry_order};
use crate::filters;
use crate::middleware::Flash;
use crate::state::AppState;

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub order: Order,
    pub toasts: Vec<Toast>,
}

/// Order detail page handler.
///
/// # Errors
///
/// Returns 404 for unknown orders, or 502 if the backend fails.
#[instrument(skip(state, toasts), fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Flash(toasts): Flash,
) -> Result<impl IntoResponse> {
    set_sentry_order(&id.to_string());
    let order = state.backend().get_order(id).await?;
    Ok(OrderShowTemplate { order, toasts })
}
