//! Order, KPI and shipment shapes exchanged with the backend admin API.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use emporium_core::{Address, Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Orders
// =============================================================================

/// A line on an order.
///
/// Items added in the edit form have no `id` until the backend stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    /// `quantity × unit_price`.
    #[must_use]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// A full order as returned by `GET /admin/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default, alias = "items")]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub shipping_amount: Money,
    #[serde(default)]
    pub tax_amount: Money,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.order_items.iter().map(|item| item.quantity).sum()
    }

    /// Whether a shipment can be created for the order.
    ///
    /// Shipped orders may get further packages; cancelled and refunded
    /// orders may not.
    #[must_use]
    pub const fn can_ship(&self) -> bool {
        !matches!(
            self.status,
            OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }
}

/// A row of the orders list.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub item_count: u32,
    #[serde(default)]
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
}

/// Headline numbers for the orders list, over the same filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderKpis {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_revenue: Money,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub processing_orders: u64,
    #[serde(default)]
    pub shipped_orders: u64,
    #[serde(default)]
    pub average_order_value: Money,
}

// =============================================================================
// Orders list query
// =============================================================================

/// Columns the orders list can be sorted by.
pub const SORT_COLUMNS: &[&str] = &["order_number", "customer_name", "total_amount", "created_at"];

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Orders list filters, shared by the page query string and the backend
/// request.
///
/// Deserialized leniently from the page URL (blank selects arrive as empty
/// strings) and cleaned up by [`OrdersQuery::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl OrdersQuery {
    /// Drop blank or unknown filters and order the date range.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let date = |v: Option<String>| {
            clean(v).and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
        };

        let mut from = date(self.date_from);
        let mut to = date(self.date_to);
        if let (Some(f), Some(t)) = (from, to)
            && f > t
        {
            (from, to) = (Some(t), Some(f));
        }

        let sort = clean(self.sort).filter(|s| SORT_COLUMNS.contains(&s.as_str()));

        Self {
            search: clean(self.search),
            status: clean(self.status).filter(|s| s.parse::<OrderStatus>().is_ok()),
            payment_status: clean(self.payment_status)
                .filter(|s| s.parse::<PaymentStatus>().is_ok()),
            date_from: from.map(|d| d.format("%Y-%m-%d").to_string()),
            date_to: to.map(|d| d.format("%Y-%m-%d").to_string()),
            direction: sort.as_ref().map(|_| self.direction.unwrap_or_default()),
            sort,
            page: self.page.filter(|p| *p > 1),
        }
    }

    /// Filter parameters without sort or page, URL-encoded.
    #[must_use]
    pub fn filter_params(&self) -> String {
        let pairs = [
            ("search", &self.search),
            ("status", &self.status),
            ("payment_status", &self.payment_status),
            ("date_from", &self.date_from),
            ("date_to", &self.date_to),
        ];
        pairs
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| format!("{key}={}", urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Query string for pagination links: filters and sort, without the page.
    #[must_use]
    pub fn preserve_params(&self) -> String {
        let mut params = self.filter_params();
        if let Some(sort) = &self.sort {
            if !params.is_empty() {
                params.push('&');
            }
            params.push_str(&format!(
                "sort={sort}&direction={}",
                self.direction.unwrap_or_default().as_str()
            ));
        }
        params
    }

    /// Query string for a column header link: sorts by `column`, flipping
    /// the direction when it is already the sort column.
    #[must_use]
    pub fn sort_params(&self, column: &str) -> String {
        let direction = if self.sort.as_deref() == Some(column) {
            self.direction.unwrap_or_default().flipped()
        } else {
            SortDirection::Desc
        };
        let filters = self.filter_params();
        let sort = format!("sort={column}&direction={}", direction.as_str());
        if filters.is_empty() {
            sort
        } else {
            format!("{filters}&{sort}")
        }
    }

    /// Whether `column` is the active sort column.
    #[must_use]
    pub fn is_sorted_by(&self, column: &str) -> bool {
        self.sort.as_deref() == Some(column)
    }

    /// Whether any filter is active.
    #[must_use]
    pub const fn has_filters(&self) -> bool {
        self.search.is_some()
            || self.status.is_some()
            || self.payment_status.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }

    /// Current value of a filter parameter, blank when unset.
    #[must_use]
    pub fn value(&self, key: &str) -> &str {
        let value = match key {
            "search" => &self.search,
            "status" => &self.status,
            "payment_status" => &self.payment_status,
            "date_from" => &self.date_from,
            "date_to" => &self.date_to,
            _ => return "",
        };
        value.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Order update
// =============================================================================

/// Body for `PATCH /admin/orders/{id}`.
///
/// The backend takes the items as a JSON-serialized array and each address
/// as a JSON-serialized object, or `null` when the order has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Money,
    pub shipping_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub order_items: String,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
}

// =============================================================================
// Shipments
// =============================================================================

/// Generates string conversions for the fixed choice lists on the ship form.
macro_rules! choice_strings {
    ($name:ident { $($variant:ident => $value:literal, $label:literal;)+ }) => {
        impl $name {
            /// Every choice, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($value => Ok(Self::$variant),)+
                    other => Err(format!("invalid {}: {other}", stringify!($name))),
                }
            }
        }
    };
}

/// Unit of the package weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Lb,
    Kg,
    Oz,
    G,
}

choice_strings!(WeightUnit {
    Lb => "lb", "Pounds";
    Kg => "kg", "Kilograms";
    Oz => "oz", "Ounces";
    G => "g", "Grams";
});

/// Unit of the package dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    #[default]
    In,
    Cm,
}

choice_strings!(DimensionUnit {
    In => "in", "Inches";
    Cm => "cm", "Centimeters";
});

/// Carrier service level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceLevel {
    #[default]
    Standard,
    Express,
    Overnight,
}

choice_strings!(ServiceLevel {
    Standard => "standard", "Standard";
    Express => "express", "Express";
    Overnight => "overnight", "Overnight";
});

/// Where the package ships from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SenderInfo {
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Who receives the package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Package dimensions and weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoxInfo {
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub dimension_unit: DimensionUnit,
    pub weight: Decimal,
    pub weight_unit: WeightUnit,
}

/// Carrier options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdditionalSettings {
    pub service_level: ServiceLevel,
    pub signature_required: bool,
    pub saturday_delivery: bool,
    pub insurance_amount: Option<Money>,
    /// Printed on the label; defaults to the order number.
    pub reference: Option<String>,
}

/// Body for `POST /admin/orders/{id}/shipments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentRequest {
    pub sender_info: SenderInfo,
    pub customer_info: CustomerInfo,
    pub shipping_address: Address,
    pub box_info: BoxInfo,
    pub additional_settings: AdditionalSettings,
}

/// Response of `POST /admin/orders/{id}/shipments`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentCreated {
    pub tracking_number: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub label_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_query_drops_unknown_values() {
        let query = OrdersQuery {
            search: Some(" ada ".to_string()),
            status: Some("lost".to_string()),
            payment_status: Some("paid".to_string()),
            sort: Some("password".to_string()),
            direction: Some(SortDirection::Asc),
            page: Some(1),
            ..OrdersQuery::default()
        }
        .normalized();

        assert_eq!(query.search.as_deref(), Some("ada"));
        assert_eq!(query.status, None);
        assert_eq!(query.payment_status.as_deref(), Some("paid"));
        assert_eq!(query.sort, None);
        assert_eq!(query.direction, None);
        assert_eq!(query.page, None);
        assert_eq!(query.value("search"), "ada");
        assert_eq!(query.value("status"), "");
        assert_eq!(query.value("sort"), "");
    }

    #[test]
    fn test_orders_query_orders_date_range() {
        let query = OrdersQuery {
            date_from: Some("2026-03-31".to_string()),
            date_to: Some("2026-03-01".to_string()),
            ..OrdersQuery::default()
        }
        .normalized();
        assert_eq!(query.date_from.as_deref(), Some("2026-03-01"));
        assert_eq!(query.date_to.as_deref(), Some("2026-03-31"));

        let query = OrdersQuery {
            date_from: Some("31/03/2026".to_string()),
            ..OrdersQuery::default()
        }
        .normalized();
        assert_eq!(query.date_from, None);
    }

    #[test]
    fn test_sort_params_flip_active_column() {
        let query = OrdersQuery {
            status: Some("pending".to_string()),
            sort: Some("total_amount".to_string()),
            direction: Some(SortDirection::Desc),
            ..OrdersQuery::default()
        };
        assert_eq!(
            query.sort_params("total_amount"),
            "status=pending&sort=total_amount&direction=asc"
        );
        assert_eq!(
            query.sort_params("created_at"),
            "status=pending&sort=created_at&direction=desc"
        );
        assert_eq!(
            query.preserve_params(),
            "status=pending&sort=total_amount&direction=desc"
        );
    }

    #[test]
    fn test_order_deserializes_backend_shape() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 7,
            "order_number": "EMP-1007",
            "status": "processing",
            "payment_status": "paid",
            "customer_name": "Ada Lovelace",
            "customer_email": "ada@example.com",
            "items": [
                {"id": 1, "name": "Sea Salt Soap", "quantity": 2, "unit_price": "6.50"}
            ],
            "subtotal": "13.00",
            "total_amount": "18.00",
            "shipping_address": null,
            "created_at": "2026-03-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(order.item_count(), 2);
        assert_eq!(
            order.order_items[0].line_total(),
            Some(Money::from_cents(1300))
        );
        assert!(order.shipping_address.is_none());
        assert!(order.can_ship());
    }

    #[test]
    fn test_choice_strings() {
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert!("stone".parse::<WeightUnit>().is_err());
        assert_eq!(ServiceLevel::Overnight.as_str(), "overnight");
        assert_eq!(DimensionUnit::ALL.len(), 2);
    }

    #[test]
    fn test_shipment_request_wire_shape() {
        let request = ShipmentRequest {
            sender_info: SenderInfo::default(),
            customer_info: CustomerInfo::default(),
            shipping_address: Address::default(),
            box_info: BoxInfo {
                weight: Decimal::new(25, 1),
                ..BoxInfo::default()
            },
            additional_settings: AdditionalSettings::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["box_info"]["weight"], "2.5");
        assert_eq!(json["box_info"]["weight_unit"], "lb");
        assert_eq!(json["additional_settings"]["service_level"], "standard");
        assert!(json["additional_settings"]["insurance_amount"].is_null());
    }
}
