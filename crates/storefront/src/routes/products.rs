//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use emporium_core::{Paginated, Toast};
use tracing::instrument;

use crate::backend::{Product, ProductQuery};
use crate::error::Result;
use crate::filters;
use crate::middleware::Flash;
use crate::routes::is_htmx;
use crate::state::AppState;

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Paginated<Product>,
    pub query: ProductQuery,
    pub preserve_params: String,
    pub toasts: Vec<Toast>,
}

/// Product grid fragment, swapped in by the debounced search box.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Paginated<Product>,
    pub preserve_params: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: Product,
    pub toasts: Vec<Toast>,
}

/// Display product listing page.
///
/// HTMX requests (search box, filter changes) only get the grid back.
#[instrument(skip(state, headers, toasts))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
    headers: HeaderMap,
    Flash(mut toasts): Flash,
) -> Response {
    let query = query.normalized();
    let products = match state.backend().list_products(&query).await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            toasts.push(Toast::generic_failure());
            Paginated::empty()
        }
    };
    let preserve_params = query.preserve_params();

    if is_htmx(&headers) {
        return ProductGridTemplate {
            products,
            preserve_params,
        }
        .into_response();
    }

    ProductsIndexTemplate {
        products,
        query,
        preserve_params,
        toasts,
    }
    .into_response()
}

/// Display product detail page.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
#[instrument(skip(state, toasts))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Flash(toasts): Flash,
) -> Result<impl IntoResponse> {
    let product = state.backend().get_product(&slug).await?;
    Ok(ProductShowTemplate { product, toasts })
}
