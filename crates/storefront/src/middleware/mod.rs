//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with a moka store)
//! 5. Security headers (CSP, frame options, etc.)
//! 6. Rate limiting (governor) on cart mutations and checkout submission

pub mod flash;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use flash::{Flash, push_toast};
pub use rate_limit::{cart_rate_limiter, checkout_rate_limiter};
pub use emporium_core::request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
