//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with a moka store)
//! 5. Security headers (stricter CSP for admin)
//!
//! The admin panel has no login of its own: it binds to a private network
//! interface and is reached over the VPN only.

pub mod flash;
pub mod security_headers;
pub mod session;

pub use flash::{Flash, push_toast};
pub use emporium_core::request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
