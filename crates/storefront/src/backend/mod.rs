//! Commerce backend client for the storefront.
//!
//! # Architecture
//!
//! - The backend is the source of truth for catalog, carts and checkout
//!   sessions - NO local persistence, direct REST calls
//! - Catalog reads are cached in memory via `moka` (5 minute TTL)
//! - Carts are identified by a backend-issued token sent in `X-Cart-Token`
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_storefront::backend::StorefrontBackend;
//!
//! let backend = StorefrontBackend::new(&config.backend)?;
//!
//! let product = backend.get_product("sea-salt-soap").await?;
//! let cart = backend.add_cart_item(None, product.id, 1).await?;
//! let cart = backend.update_cart_item(cart.token.as_deref().unwrap_or_default(), cart.items[0].id, 3).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use emporium_core::{CartItemId, CheckoutSessionId, Paginated, ProductId};
use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

pub use cache::{CacheKey, CacheValue};
pub use types::*;

/// Header carrying the shopper's cart token.
pub const CART_TOKEN_HEADER: &str = "x-cart-token";

/// Errors that can occur when calling the commerce backend.
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

    /// Client could not be constructed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackendError {
    /// Messages to show the user, if the backend rejected their input.
    #[must_use]
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation(messages) => Some(messages),
            _ => None,
        }
    }
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
// StorefrontBackend
// =============================================================================

/// Client for the storefront endpoints of the commerce backend.
#[derive(Clone)]
pub struct StorefrontBackend {
    inner: Arc<StorefrontBackendInner>,
}

struct StorefrontBackendInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_token.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| BackendError::Config(format!("Invalid API token format: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(StorefrontBackendInner {
                client,
                base_url: config.base_url.clone(),
                cache,
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

    fn cart_request(
        &self,
        method: Method,
        path: &str,
        cart_token: Option<&str>,
    ) -> Result<RequestBuilder, BackendError> {
        let request = self.request(method, path)?;
        Ok(match cart_token {
            Some(token) => request.header(CART_TOKEN_HEADER, token),
            None => request,
        })
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
                error_body.message.unwrap_or_else(|| "resource".to_string()),
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

    // =========================================================================
    // Health
    // =========================================================================

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
    // Catalog
    // =========================================================================

    /// Get a page of products.
    ///
    /// Unfiltered pages are cached; search results are not.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Paginated<Product>, BackendError> {
        let cacheable = query.search.is_none();
        let key = CacheKey::Products(query.clone());

        if cacheable && let Some(CacheValue::Products(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let page: Paginated<Product> =
            Self::send(self.request(Method::GET, "products")?.query(query)).await?;

        if cacheable {
            self.inner
                .cache
                .insert(key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product(&self, slug: &str) -> Result<Product, BackendError> {
        let key = CacheKey::Product(slug.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("products/{}", urlencoding::encode(slug));
        let product: Product = Self::send(self.request(Method::GET, &path)?).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the cart for a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, cart_token))]
    pub async fn get_cart(&self, cart_token: &str) -> Result<Cart, BackendError> {
        Self::send(self.cart_request(Method::GET, "cart", Some(cart_token))?).await
    }

    /// Add a product to the cart, creating the cart when `cart_token` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the backend rejects the item.
    #[instrument(skip(self, cart_token))]
    pub async fn add_cart_item(
        &self,
        cart_token: Option<&str>,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, BackendError> {
        let body = AddCartItem {
            product_id,
            quantity,
        };
        Self::send(
            self.cart_request(Method::POST, "cart/items", cart_token)?
                .json(&body),
        )
        .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the backend rejects the quantity.
    #[instrument(skip(self, cart_token))]
    pub async fn update_cart_item(
        &self,
        cart_token: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, BackendError> {
        let path = format!("cart/items/{item_id}");
        Self::send(
            self.cart_request(Method::PUT, &path, Some(cart_token))?
                .json(&CartItemQuantity { quantity }),
        )
        .await
    }

    /// Remove a cart line. `quantity` is the number of units being removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, cart_token))]
    pub async fn remove_cart_item(
        &self,
        cart_token: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, BackendError> {
        let path = format!("cart/items/{item_id}");
        Self::send(
            self.cart_request(Method::DELETE, &path, Some(cart_token))?
                .json(&CartItemQuantity { quantity }),
        )
        .await
    }

    /// Apply a coupon code to the cart.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend rejects the code.
    #[instrument(skip(self, cart_token))]
    pub async fn apply_coupon(&self, cart_token: &str, code: &str) -> Result<Cart, BackendError> {
        Self::send(
            self.cart_request(Method::POST, "cart/coupon", Some(cart_token))?
                .json(&ApplyCoupon {
                    code: code.to_string(),
                }),
        )
        .await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Create a hosted checkout session for the cart.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend rejects the checkout data, or an
    /// error if the API request fails.
    #[instrument(skip(self, cart_token, request), fields(guest = request.guest))]
    pub async fn create_checkout_session(
        &self,
        cart_token: &str,
        request: &CreateCheckoutSession,
    ) -> Result<CheckoutSessionCreated, BackendError> {
        Self::send(
            self.cart_request(Method::POST, "checkout/sessions", Some(cart_token))?
                .json(request),
        )
        .await
    }

    /// Fetch a checkout session.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown sessions, or an error if the API request fails.
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn get_checkout_session(
        &self,
        id: &CheckoutSessionId,
    ) -> Result<CheckoutSession, BackendError> {
        let path = format!("checkout/sessions/{}", urlencoding::encode(id.as_str()));
        Self::send(self.request(Method::GET, &path)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_keeps_field_order() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"message": "The given data was invalid.", "errors": {"shipping_city": ["Shipping city is required."], "email": ["Email is invalid."], "address1": "Address is required."}}"#,
        )
        .unwrap_or_default();

        assert_eq!(
            body.into_messages(),
            vec![
                "Shipping city is required.".to_string(),
                "Email is invalid.".to_string(),
                "Address is required.".to_string()
            ]
        );
    }

    #[test]
    fn test_error_body_flattens_field_errors() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "message": "The given data was invalid.",
            "errors": {
                "email": ["The email has already been used."],
                "quantity": "Only 2 left in stock."
            }
        }))
        .unwrap_or_default();

        assert_eq!(
            body.into_messages(),
            vec![
                "The email has already been used.".to_string(),
                "Only 2 left in stock.".to_string()
            ]
        );
    }

    #[test]
    fn test_error_body_falls_back_to_message() {
        let body: ErrorBody =
            serde_json::from_value(serde_json::json!({"message": "Coupon expired"}))
                .unwrap_or_default();
        assert_eq!(body.into_messages(), vec!["Coupon expired".to_string()]);
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Validation(vec!["Coupon expired".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: Coupon expired");
        assert!(err.validation_messages().is_some());

        let err = BackendError::Api {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");
    }
}
