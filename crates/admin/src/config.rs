//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - URL the admin panel is reached at (private network)
//! - `BACKEND_API_URL` - Base URL of the commerce backend API
//! - `BACKEND_ADMIN_TOKEN` - Admin API token for the backend (high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_STATIC_DIR` - Static asset directory (default: crates/admin/static)
//! - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `SHIP_FROM_NAME`, `SHIP_FROM_COMPANY`, `SHIP_FROM_PHONE`,
//!   `SHIP_FROM_ADDRESS1`, `SHIP_FROM_CITY`, `SHIP_FROM_STATE`,
//!   `SHIP_FROM_POSTAL_CODE`, `SHIP_FROM_COUNTRY` - Sender defaults for the
//!   ship form
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use emporium_core::config::{env, parse_env};

pub use emporium_core::config::{BackendConfig, ConfigError};

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub host: IpAddr,
    pub port: u16,
    /// URL the panel is served at.
    pub base_url: String,
    /// Static asset directory
    pub static_dir: PathBuf,
    /// Backend connection, authenticated with the admin-scoped token.
    pub backend: BackendConfig,
    /// Sender defaults for shipments
    pub ship_from: ShipFrom,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Warehouse the store ships from. Prefills the sender section of the ship form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipFrom {
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Default for ShipFrom {
    fn default() -> Self {
        Self {
            name: "Emporium Fulfillment".to_string(),
            company: Some("Emporium".to_string()),
            phone: None,
            address1: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: "US".to_string(),
        }
    }
}

impl ShipFrom {
    fn from_env() -> Self {
        let defaults = Self::default();
        let field = |key: &str| env::optional(key).unwrap_or_default();
        Self {
            name: env::optional("SHIP_FROM_NAME").unwrap_or(defaults.name),
            company: env::optional("SHIP_FROM_COMPANY").or(defaults.company),
            phone: env::optional("SHIP_FROM_PHONE"),
            address1: field("SHIP_FROM_ADDRESS1"),
            city: field("SHIP_FROM_CITY"),
            state: field("SHIP_FROM_STATE"),
            postal_code: field("SHIP_FROM_POSTAL_CODE"),
            country: env::optional("SHIP_FROM_COUNTRY").unwrap_or(defaults.country),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the backend token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: parse_env("ADMIN_HOST", "127.0.0.1")?,
            port: env::parse_or("ADMIN_PORT", 3001)?,
            base_url: env::required("ADMIN_BASE_URL")?,
            static_dir: env::or_default("ADMIN_STATIC_DIR", "crates/admin/static").into(),
            backend: BackendConfig::from_env("BACKEND_ADMIN_TOKEN")?,
            ship_from: ShipFrom::from_env(),
            sentry_dsn: env::optional("SENTRY_DSN"),
            sentry_environment: env::optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}
