//! Commerce backend client for the admin panel.
//!
//! # Architecture
//!
//! - The backend owns orders, payments and shipments; the admin panel reads
//!   and mutates them over the `/admin` REST endpoints
//! - Every request carries the admin bearer token
//! - Nothing is cached: order pages always show the backend's current state
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_admin::backend::AdminBackend;
//!
//! let backend = AdminBackend::new(&config.backend)?;
//! let order = backend.get_order(OrderId::new(7)).await?;
//! ```

pub mod types;

use std::sync::Arc;

use emporium_core::{OrderId, Paginated};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::BackendConfig;

pub use types::*;

/// Errors that can occur when calling the backend admin API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the submitted data (HTTP 422).
    #[error("Validation failed: {}", .0.first().map_or("", String::as_str))]
    Validation(Vec<String>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request could not be built.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorBody {
    /// Flatten the field error map into messages, falling back to `message`.
    fn into_messages(self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .errors
            .unwrap_or_default()
            .into_iter()
            .flat_map(|(_, value)| match value {
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect::<Vec<_>>(),
                serde_json::Value::String(s) => vec![s],
                _ => Vec::new(),
            })
            .collect();

        if messages.is_empty()
            && let Some(message) = self.message
        {
            messages.push(message);
        }
        messages
    }
}

// =============================================================================
// AdminBackend
// =============================================================================

/// Client for the admin endpoints of the commerce backend.
#[derive(Clone)]
pub struct AdminBackend {
    inner: Arc<AdminBackendInner>,
}

struct AdminBackendInner {
    client: reqwest::Client,
    base_url: Url,
}

impl AdminBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| BackendError::Config(format!("Invalid API token format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminBackendInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| BackendError::Config(format!("Invalid path {path}: {e}")))?;
        Ok(self.inner.client.request(method, url))
    }

    /// Send a request and decode the JSON response.
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                BackendError::Parse(e.to_string())
            });
        }

        let error_body: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        match status {
            StatusCode::UNPROCESSABLE_ENTITY => {
                Err(BackendError::Validation(error_body.into_messages()))
            }
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(
                error_body.message.unwrap_or_else(|| "order".to_string()),
            )),
            _ => {
                tracing::warn!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned non-success status"
                );
                Err(BackendError::Api {
                    status: status.as_u16(),
                    message: error_body
                        .message
                        .unwrap_or_else(|| body.chars().take(200).collect()),
                })
            }
        }
    }

    /// Check that the backend answers its health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), BackendError> {
        let response = self.request(Method::GET, "health")?.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Api {
                status: response.status().as_u16(),
                message: "health check failed".to_string(),
            })
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Get a page of orders matching the filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        query: &OrdersQuery,
    ) -> Result<Paginated<OrderSummary>, BackendError> {
        Self::send(self.request(Method::GET, "admin/orders")?.query(query)).await
    }

    /// Get the KPI figures for the orders matching the filters.
    ///
    /// Sorting and paging do not affect the figures, so they are not sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn order_kpis(&self, query: &OrdersQuery) -> Result<OrderKpis, BackendError> {
        let filters = OrdersQuery {
            sort: None,
            direction: None,
            page: None,
            ..query.clone()
        };
        Self::send(
            self.request(Method::GET, "admin/orders/kpis")?
                .query(&filters),
        )
        .await
    }

    /// Get a single order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown orders, or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, BackendError> {
        Self::send(self.request(Method::GET, &format!("admin/orders/{id}"))?).await
    }

    /// Update an order.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend rejects the update, or an error if
    /// the API request fails.
    #[instrument(skip(self, update), fields(order_id = %id, status = %update.status))]
    pub async fn update_order(&self, id: OrderId, update: &OrderUpdate) -> Result<Order, BackendError> {
        Self::send(
            self.request(Method::PATCH, &format!("admin/orders/{id}"))?
                .json(update),
        )
        .await
    }

    /// Create a shipment (buy a label) for an order.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend or carrier rejects the shipment,
    /// or an error if the API request fails.
    #[instrument(skip(self, shipment), fields(order_id = %id))]
    pub async fn create_shipment(
        &self,
        id: OrderId,
        shipment: &ShipmentRequest,
    ) -> Result<ShipmentCreated, BackendError> {
        Self::send(
            self.request(Method::POST, &format!("admin/orders/{id}/shipments"))?
                .json(shipment),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_keeps_field_order() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"errors": {"tracking_number": ["Tracking number has already been used."], "carrier": ["Carrier is not supported."]}}"#,
        )
        .unwrap_or_default();

        assert_eq!(
            body.into_messages(),
            vec![
                "Tracking number has already been used.".to_string(),
                "Carrier is not supported.".to_string()
            ]
        );
    }

    #[test]
    fn test_error_body_flattens_field_errors() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "message": "The given data was invalid.",
            "errors": {
                "box_info.weight": ["Weight exceeds the carrier limit."],
                "tracking_number": "Tracking number has already been used."
            }
        }))
        .unwrap_or_default();

        assert_eq!(
            body.into_messages(),
            vec![
                "Weight exceeds the carrier limit.".to_string(),
                "Tracking number has already been used.".to_string()
            ]
        );
    }

    #[test]
    fn test_error_body_without_details() {
        let body = ErrorBody::default();
        assert!(body.into_messages().is_empty());
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("order".to_string());
        assert_eq!(err.to_string(), "Not found: order");
    }
}
