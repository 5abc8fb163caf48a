//! Status enums for orders, payments and checkout sessions.
//!
//! Values mirror the snake_case strings the backend sends and accepts.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Generates the shared string conversions for a status enum.
macro_rules! status_strings {
    ($name:ident { $($variant:ident => $value:literal, $label:literal, $class:literal;)+ }) => {
        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire value (e.g. `"partially_refunded"`).
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            /// Human readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Badge CSS class for templates.
            #[must_use]
            pub const fn badge_class(self) -> &'static str {
                match self {
                    $(Self::$variant => $class),+
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

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

status_strings!(OrderStatus {
    Pending => "pending", "Pending", "badge-warning";
    Processing => "processing", "Processing", "badge-info";
    Shipped => "shipped", "Shipped", "badge-primary";
    Delivered => "delivered", "Delivered", "badge-success";
    Cancelled => "cancelled", "Cancelled", "badge-secondary";
    Refunded => "refunded", "Refunded", "badge-danger";
});

impl OrderStatus {
    /// Whether an order in this status must carry a tracking number.
    #[must_use]
    pub const fn requires_tracking(self) -> bool {
        matches!(self, Self::Shipped | Self::Delivered)
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
}

status_strings!(PaymentStatus {
    Pending => "pending", "Pending", "badge-warning";
    Paid => "paid", "Paid", "badge-success";
    Failed => "failed", "Failed", "badge-danger";
    Refunded => "refunded", "Refunded", "badge-secondary";
    PartiallyRefunded => "partially_refunded", "Partially refunded", "badge-info";
});

/// Status of a hosted checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutSessionStatus {
    #[default]
    Open,
    Complete,
    Expired,
}

status_strings!(CheckoutSessionStatus {
    Open => "open", "Awaiting payment", "badge-warning";
    Complete => "complete", "Paid", "badge-success";
    Expired => "expired", "Expired", "badge-secondary";
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_status_wire_value_matches_serde() {
        let json = serde_json::to_string(&PaymentStatus::PartiallyRefunded).unwrap();
        assert_eq!(json, format!("\"{}\"", PaymentStatus::PartiallyRefunded.as_str()));
    }

    #[test]
    fn test_requires_tracking() {
        assert!(OrderStatus::Shipped.requires_tracking());
        assert!(OrderStatus::Delivered.requires_tracking());
        assert!(!OrderStatus::Processing.requires_tracking());
    }

    #[test]
    fn test_labels() {
        assert_eq!(CheckoutSessionStatus::Complete.label(), "Paid");
        assert_eq!(OrderStatus::Cancelled.badge_class(), "badge-secondary");
    }
}
