//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use emporium_core::Toast;
use tracing::instrument;

use crate::backend::{Product, ProductQuery};
use crate::filters;
use crate::middleware::Flash;
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_COUNT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub featured_products: Vec<Product>,
    pub toasts: Vec<Toast>,
}

/// Display home page.
///
/// A backend outage degrades to a page without featured products.
#[instrument(skip(state, toasts))]
pub async fn home(State(state): State<AppState>, Flash(toasts): Flash) -> impl IntoResponse {
    let featured_products = match state.backend().list_products(&ProductQuery::default()).await {
        Ok(page) => page.data.into_iter().take(FEATURED_COUNT).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch featured products: {e}");
            Vec::new()
        }
    };

    HomeTemplate {
        featured_products,
        toasts,
    }
}
