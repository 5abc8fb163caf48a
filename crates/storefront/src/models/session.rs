//! Session-related types.
//!
//! The storefront keeps no database. Everything that must outlive a single
//! request (cart token, checkout progress, pending toasts) lives in the
//! session.

use emporium_core::Address;
use serde::{Deserialize, Serialize};

use crate::backend::CheckoutContact;

/// Checkout progress between the contact step and session creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub contact: CheckoutContact,
    /// Shopper chose to check out without an account.
    pub guest: bool,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub same_as_shipping: bool,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutDraft {
    /// Whether the contact step has been completed.
    #[must_use]
    pub fn has_contact(&self) -> bool {
        !self.contact.email.is_empty()
    }

    /// Billing address actually sent to the backend.
    #[must_use]
    pub fn effective_billing_address(&self) -> Address {
        if self.same_as_shipping {
            self.shipping_address.clone()
        } else {
            self.billing_address.clone()
        }
    }
}

/// Session keys.
pub mod keys {
    /// Backend-issued token identifying the shopper's cart.
    pub const CART_TOKEN: &str = "cart_token";

    /// In-progress checkout ([`super::CheckoutDraft`]).
    pub const CHECKOUT_DRAFT: &str = "checkout_draft";

    /// Toasts queued for the next rendered page.
    pub const TOASTS: &str = "toasts";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_contact() {
        let mut draft = CheckoutDraft::default();
        assert!(!draft.has_contact());
        draft.contact.email = "ada@example.com".to_string();
        assert!(draft.has_contact());
    }

    #[test]
    fn test_effective_billing_address() {
        let mut draft = CheckoutDraft::default();
        draft.shipping_address.city = "Portland".to_string();
        draft.billing_address.city = "Salem".to_string();

        assert_eq!(draft.effective_billing_address().city, "Salem");
        draft.same_as_shipping = true;
        assert_eq!(draft.effective_billing_address().city, "Portland");
    }
}
