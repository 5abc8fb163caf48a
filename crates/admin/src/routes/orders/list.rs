//! Orders list page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use emporium_core::{Paginated, Toast};
use tracing::instrument;

use crate::backend::{OrderKpis, OrderSummary, OrdersQuery};
use crate::components::data_table::{DataTableConfig, orders_table_config};
use crate::filters;
use crate::middleware::Flash;
use crate::routes::is_htmx;
use crate::state::AppState;

/// Orders per page requested from the backend.
pub const PER_PAGE: u32 = 25;

/// Orders list page: KPI cards, filter bar and the orders table.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub table: DataTableConfig,
    pub orders: Paginated<OrderSummary>,
    pub kpis: Option<OrderKpis>,
    pub query: OrdersQuery,
    /// Filters and sort, carried by pagination links.
    pub preserve_params: String,
    pub toasts: Vec<Toast>,
}

/// Orders table fragment swapped in by the filter bar, sort headers and
/// pagination links.
#[derive(Template, WebTemplate)]
#[template(path = "partials/orders_table_fragment.html")]
pub struct OrdersTableTemplate {
    pub table: DataTableConfig,
    pub orders: Paginated<OrderSummary>,
    pub query: OrdersQuery,
    pub preserve_params: String,
    pub toasts: Vec<Toast>,
}

fn empty_page(query: &OrdersQuery) -> Paginated<OrderSummary> {
    Paginated {
        data: Vec::new(),
        current_page: query.page.unwrap_or(1),
        last_page: 1,
        per_page: PER_PAGE,
        total: 0,
    }
}

/// Orders list page handler.
///
/// HTMX requests receive only the table fragment. A backend failure shows an
/// empty table and an error toast rather than an error page.
#[instrument(skip(state, headers, toasts))]
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OrdersQuery>,
    Flash(mut toasts): Flash,
) -> Response {
    let query = query.normalized();
    let table = orders_table_config();
    let preserve_params = query.preserve_params();

    if is_htmx(&headers) {
        let orders = match state.backend().list_orders(&query).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!("Failed to fetch orders: {e}");
                toasts.push(Toast::generic_failure());
                empty_page(&query)
            }
        };
        return OrdersTableTemplate {
            table,
            orders,
            query,
            preserve_params,
            toasts,
        }
        .into_response();
    }

    let (orders, kpis) = tokio::join!(
        state.backend().list_orders(&query),
        state.backend().order_kpis(&query)
    );

    let orders = orders.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch orders: {e}");
        toasts.push(Toast::generic_failure());
        empty_page(&query)
    });
    let kpis = kpis
        .inspect_err(|e| tracing::warn!("Failed to fetch order KPIs: {e}"))
        .ok();

    OrdersIndexTemplate {
        table,
        orders,
        kpis,
        query,
        preserve_params,
        toasts,
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page_keeps_requested_page() {
        let query = OrdersQuery {
            page: Some(3),
            ..OrdersQuery::default()
        };
        let page = empty_page(&query);
        assert_eq!(page.current_page, 3);
        assert!(page.data.is_empty());
        assert_eq!(page.per_page, PER_PAGE);
    }
}
