//! Emporium Core - Shared types library.
//!
//! This crate provides the types shared by the Emporium page layer:
//! - `storefront` - Public storefront and checkout flow
//! - `admin` - Internal order management panel
//!
//! # Architecture
//!
//! The core crate contains types and pure functions, plus the environment
//! loading both apps share. It has no HTTP clients. Entities here mirror
//! backend response shapes and live only for the duration of a page visit.
//!
//! # Modules
//!
//! - [`config`] - Backend connection settings and environment helpers
//! - [`types`] - IDs, money, emails, statuses and addresses
//! - [`validation`] - Presence/format checks producing human readable messages
//! - [`toast`] - Notification messages surfaced after form submissions
//! - [`pagination`] - Paginated list responses and page link windows
//! - `request_id` - Request ID middleware (`web` feature)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod pagination;
#[cfg(feature = "web")]
pub mod request_id;
pub mod toast;
pub mod types;
pub mod validation;

pub use pagination::{PageLink, Paginated};
pub use toast::{Toast, ToastKind};
pub use types::*;
pub use validation::{ValidationErrors, Validator};
