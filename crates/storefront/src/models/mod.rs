//! Session-held models for the storefront.

pub mod session;

pub use session::{CheckoutDraft, keys as session_keys};
