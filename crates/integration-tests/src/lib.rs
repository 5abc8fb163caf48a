//! Integration test harness for Emporium.
//!
//! Each test starts a [`FakeBackend`] (an in-process stand-in for the commerce
//! backend that records every request and answers with canned JSON) and runs
//! the storefront or admin app against it on an ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Path prefix the fake backend serves under, so URL joining is exercised.
pub const API_PREFIX: &str = "/api";

/// Token both apps are configured with.
pub const TEST_TOKEN: &str = "test-token";

// =============================================================================
// Fake backend
// =============================================================================

/// A request received by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path without the [`API_PREFIX`].
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Body decoded as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }

    /// Value of a request header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct FakeBackendInner {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
}

/// In-process commerce backend.
#[derive(Clone)]
pub struct FakeBackend {
    url: String,
    inner: Arc<FakeBackendInner>,
}

impl FakeBackend {
    /// Start the fake backend on an ephemeral port.
    pub async fn start() -> Self {
        let inner = Arc::new(FakeBackendInner::default());
        let router = Router::new().fallback(record).with_state(inner.clone());
        let addr = serve(router).await;

        let backend = Self {
            url: format!("http://{addr}{API_PREFIX}/"),
            inner,
        };
        backend.respond(Method::GET, "/health", StatusCode::OK, json!({"status": "ok"}));
        backend
    }

    /// Base URL to configure the apps with.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Answer `method path` with `status` and `body`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.inner
            .responses
            .lock()
            .expect("responses lock")
            .insert((method, path.to_string()), (status, body));
    }

    /// Answer `method path` with 200 and `body`.
    pub fn ok(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, StatusCode::OK, body);
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.lock().expect("requests lock").clone()
    }

    /// The last request received for `method path`.
    #[must_use]
    pub fn last(&self, method: &Method, path: &str) -> Option<RecordedRequest> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == *method && r.path == path)
    }
}

async fn record(
    State(inner): State<Arc<FakeBackendInner>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();

    let response = inner
        .responses
        .lock()
        .expect("responses lock")
        .get(&(method.clone(), path.clone()))
        .cloned();

    inner
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method,
            path,
            query: uri.query().map(str::to_string),
            headers,
            body,
        });

    match response {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response(),
    }
}

// =============================================================================
// Apps
// =============================================================================

/// Serve `router` on an ephemeral port and return its address.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server");
    });
    addr
}

fn crate_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join(name)
}

/// Start the storefront against `backend`; returns its base URL.
pub async fn start_storefront(backend: &FakeBackend) -> String {
    use emporium_storefront::config::{BackendConfig, StorefrontConfig};

    let config = StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://shop.test".to_string(),
        content_dir: crate_dir("storefront").join("content"),
        static_dir: crate_dir("storefront").join("static"),
        backend: BackendConfig::new(backend.url(), TEST_TOKEN).expect("backend config"),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = emporium_storefront::state::AppState::new(config).expect("storefront state");
    let addr = serve(emporium_storefront::app(state)).await;
    format!("http://{addr}")
}

/// Start the admin panel against `backend`; returns its base URL.
pub async fn start_admin(backend: &FakeBackend) -> String {
    use emporium_admin::config::{AdminConfig, BackendConfig, ShipFrom};

    let config = AdminConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://admin.test".to_string(),
        static_dir: crate_dir("admin").join("static"),
        backend: BackendConfig::new(backend.url(), TEST_TOKEN).expect("backend config"),
        ship_from: ShipFrom {
            address1: "1 Dock St".to_string(),
            city: "Portland".to_string(),
            state: "OR".to_string(),
            postal_code: "97209".to_string(),
            ..ShipFrom::default()
        },
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = emporium_admin::state::AppState::new(config).expect("admin state");
    let addr = serve(emporium_admin::app(state)).await;
    format!("http://{addr}")
}

/// Browser-like client: keeps cookies, does not follow redirects.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()
        .expect("HTTP client")
}

// =============================================================================
// Fixtures
// =============================================================================

/// A backend cart with one line (`id` 5, quantity `quantity`).
#[must_use]
pub fn cart_json(quantity: u32) -> Value {
    json!({
        "token": "ct_1",
        "items": [{
            "id": 5,
            "product_id": 1,
            "product_name": "Sea Salt Soap",
            "unit_price": "6.50",
            "quantity": quantity,
            "line_total": format!("{:.2}", 6.5 * f64::from(quantity))
        }],
        "subtotal": "6.50",
        "total": "6.50"
    })
}

/// A backend order (`id` 7, one item).
#[must_use]
pub fn order_json(status: &str) -> Value {
    json!({
        "id": 7,
        "order_number": "EMP-1007",
        "status": status,
        "payment_status": "paid",
        "customer_name": "Ada Lovelace",
        "customer_email": "ada@example.com",
        "order_items": [
            {"id": 1, "product_id": 1, "name": "Sea Salt Soap", "quantity": 2, "unit_price": "6.50"}
        ],
        "subtotal": "13.00",
        "shipping_amount": "5.00",
        "tax_amount": "1.25",
        "total_amount": "19.25",
        "shipping_address": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "address1": "12 Analytical Row",
            "city": "Portland",
            "state": "OR",
            "postal_code": "97201",
            "country": "US"
        },
        "created_at": "2026-03-14T15:09:26Z"
    })
}
