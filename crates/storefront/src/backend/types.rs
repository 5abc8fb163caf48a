//! Response and request shapes for the commerce backend.
//!
//! These mirror the backend's JSON. They live for one request and carry no
//! invariants beyond what the backend enforces.

use chrono::{DateTime, Utc};
use emporium_core::{
    Address, CartItemId, CheckoutSessionId, CheckoutSessionStatus, Money, ProductId,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Products
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub compare_at_price: Option<Money>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Whether the product is discounted against its compare-at price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .is_some_and(|compare| compare.amount > self.price.amount)
    }
}

/// Catalog filters, shared by the page query string and the backend request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl ProductQuery {
    /// Drop blank filters so `?search=` behaves like no search.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            search: clean(self.search),
            category: clean(self.category),
            page: self.page.filter(|p| *p > 1),
        }
    }

    /// Query string for pagination links, without the page number.
    #[must_use]
    pub fn preserve_params(&self) -> String {
        let mut params = Vec::new();
        if let Some(search) = &self.search {
            params.push(format!("search={}", urlencoding::encode(search)));
        }
        if let Some(category) = &self.category {
            params.push(format!("category={}", urlencoding::encode(category)));
        }
        params.join("&")
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A line in the shopper's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

/// The shopper's cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Token identifying the cart; issued by the backend on first add.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub shipping_amount: Money,
    #[serde(default)]
    pub tax_amount: Money,
    #[serde(default)]
    pub total: Money,
}

impl Cart {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Body for `POST /cart/items`.
#[derive(Debug, Clone, Serialize)]
pub struct AddCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for `PUT` and `DELETE /cart/items/{id}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartItemQuantity {
    pub quantity: u32,
}

/// Body for `POST /cart/coupon`.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyCoupon {
    pub code: String,
}

// =============================================================================
// Checkout
// =============================================================================

/// Contact details collected during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutContact {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Body for `POST /checkout/sessions`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckoutSession {
    pub contact: CheckoutContact,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub same_as_shipping: bool,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    pub guest: bool,
    /// Where the payment page sends the shopper after paying.
    pub success_url: String,
    /// Where the payment page sends the shopper if they abandon payment.
    pub cancel_url: String,
}

/// Response of `POST /checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionCreated {
    pub id: CheckoutSessionId,
    pub redirect_url: String,
}

/// A hosted checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: CheckoutSessionId,
    #[serde(default)]
    pub status: CheckoutSessionStatus,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub shipping_amount: Money,
    #[serde(default)]
    pub tax_amount: Money,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_normalized() {
        let query = ProductQuery {
            search: Some("  ".to_string()),
            category: Some(" soap ".to_string()),
            page: Some(1),
        }
        .normalized();
        assert_eq!(query.search, None);
        assert_eq!(query.category.as_deref(), Some("soap"));
        assert_eq!(query.page, None);
    }

    #[test]
    fn test_preserve_params_encodes() {
        let query = ProductQuery {
            search: Some("bath & body".to_string()),
            category: None,
            page: Some(3),
        };
        assert_eq!(query.preserve_params(), "search=bath%20%26%20body");
    }

    #[test]
    fn test_cart_deserializes_backend_shape() {
        let cart: Cart = serde_json::from_value(serde_json::json!({
            "token": "ct_1",
            "items": [{
                "id": 5,
                "product_id": 9,
                "product_name": "Sea Salt Soap",
                "unit_price": "6.50",
                "quantity": 2,
                "line_total": "13.00"
            }],
            "subtotal": "13.00",
            "total": "13.00"
        }))
        .unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total, Money::from_cents(1300));
        assert!(cart.item(CartItemId::new(5)).is_some());
        assert_eq!(cart.discount_amount, Money::zero());
    }

    #[test]
    fn test_product_on_sale() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 1, "slug": "soap", "name": "Soap",
            "price": "5.00", "compare_at_price": "7.00"
        }))
        .unwrap();
        assert!(product.is_on_sale());
        assert!(product.in_stock);
    }
}
