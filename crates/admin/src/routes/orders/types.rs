//! Form types, validation and view helpers for order pages.

use std::collections::HashMap;
use std::str::FromStr;

use emporium_core::{
    Address, Money, OrderItemId, OrderStatus, PaymentStatus, ProductId, ValidationErrors,
    Validator,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{
    AdditionalSettings, BoxInfo, CustomerInfo, DimensionUnit, Order, OrderItem, OrderUpdate,
    SenderInfo, ServiceLevel, ShipmentRequest, WeightUnit,
};
use crate::config::ShipFrom;

/// Longest order note the backend stores.
pub const MAX_NOTES_LENGTH: usize = 2000;

/// Longest tracking number accepted.
pub const MAX_TRACKING_LENGTH: usize = 64;

/// Longest label reference accepted.
pub const MAX_REFERENCE_LENGTH: usize = 50;

// =============================================================================
// Totals
// =============================================================================

/// Order amounts, always derived from the items on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_amount: Money,
    pub tax_amount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// `subtotal = Σ quantity × unit_price`, `total = subtotal + shipping + tax`.
    ///
    /// Returns `None` if any sum overflows.
    #[must_use]
    pub fn compute(
        items: &[OrderItem],
        shipping_amount: Money,
        tax_amount: Money,
    ) -> Option<Self> {
        let subtotal = items
            .iter()
            .try_fold(Money::zero(), |sum, item| sum.checked_add(item.line_total()?))?;
        let total = subtotal
            .checked_add(shipping_amount)?
            .checked_add(tax_amount)?;
        Some(Self {
            subtotal,
            shipping_amount,
            tax_amount,
            total,
        })
    }
}

// =============================================================================
// Edit form
// =============================================================================

/// Submitted order edit form.
///
/// The items editor and the address sections post their state as JSON
/// strings (`order_items`, `billing_address`, `shipping_address`). Client
/// side totals are never read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderEditForm {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub shipping_amount: String,
    #[serde(default)]
    pub tax_amount: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default)]
    pub order_items: String,
    #[serde(default)]
    pub billing_address: String,
    #[serde(default)]
    pub shipping_address: String,
}

/// An item as posted by the items editor.
///
/// Quantities and prices may arrive as strings or numbers.
#[derive(Debug, Default, Deserialize)]
struct ItemInput {
    #[serde(default)]
    id: Option<OrderItemId>,
    #[serde(default)]
    product_id: Option<ProductId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    unit_price: Value,
}

/// One row of the items editor, as strings for re-rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRow {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub quantity: String,
    pub unit_price: String,
}

impl ItemRow {
    /// Blank row template used by the "Add item" button.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            quantity: "1".to_string(),
            unit_price: "0.00".to_string(),
            ..Self::default()
        }
    }
}

/// Validated order edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEdit {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,
    /// Computed from `items` and the submitted shipping and tax.
    pub totals: OrderTotals,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
}

impl OrderEdit {
    /// Build the PATCH body, serializing items and addresses to JSON strings.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_update(&self) -> Result<OrderUpdate, serde_json::Error> {
        let totals = &self.totals;
        Ok(OrderUpdate {
            status: self.status,
            payment_status: self.payment_status,
            subtotal: totals.subtotal,
            shipping_amount: totals.shipping_amount,
            tax_amount: totals.tax_amount,
            total_amount: totals.total,
            notes: self.notes.clone(),
            tracking_number: self.tracking_number.clone(),
            order_items: serde_json::to_string(&self.items)?,
            billing_address: self
                .billing_address
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            shipping_address: self
                .shipping_address
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        })
    }
}

/// Text of a JSON scalar; strings as-is, numbers formatted, anything else blank.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse a posted address. Blank, `null` and all-empty objects mean "no address".
fn parse_address(raw: &str) -> Result<Option<Address>, serde_json::Error> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    let address: Option<Address> = serde_json::from_str(raw)?;
    Ok(address
        .map(Address::normalized)
        .filter(|address| !address.is_blank()))
}

impl OrderEditForm {
    /// Prefill the form from the stored order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        let address_json = |address: &Option<Address>| {
            address
                .as_ref()
                .and_then(|a| serde_json::to_string(a).ok())
                .unwrap_or_else(|| "null".to_string())
        };

        Self {
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            shipping_amount: order.shipping_amount.input_value(),
            tax_amount: order.tax_amount.input_value(),
            notes: order.notes.clone().unwrap_or_default(),
            tracking_number: order.tracking_number.clone().unwrap_or_default(),
            order_items: serde_json::to_string(&order.order_items)
                .unwrap_or_else(|_| "[]".to_string()),
            billing_address: address_json(&order.billing_address),
            shipping_address: address_json(&order.shipping_address),
        }
    }

    /// Items editor rows, parsed leniently so rejected input can be shown again.
    #[must_use]
    pub fn item_rows(&self) -> Vec<ItemRow> {
        let items: Vec<ItemInput> = serde_json::from_str(&self.order_items).unwrap_or_default();
        items
            .into_iter()
            .map(|item| ItemRow {
                id: item.id.map(|id| id.to_string()).unwrap_or_default(),
                product_id: item.product_id.map(|id| id.to_string()).unwrap_or_default(),
                name: item.name,
                sku: item.sku.unwrap_or_default(),
                quantity: value_text(&item.quantity),
                unit_price: value_text(&item.unit_price),
            })
            .collect()
    }

    /// Shipping address for the address inputs (blank when absent or unreadable).
    #[must_use]
    pub fn shipping_fields(&self) -> Address {
        parse_address(&self.shipping_address)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Billing address for the address inputs (blank when absent or unreadable).
    #[must_use]
    pub fn billing_fields(&self) -> Address {
        parse_address(&self.billing_address)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Validate the items and amounts only (used for the live totals preview).
    ///
    /// # Errors
    ///
    /// Returns every failed check, in form order.
    pub fn validate_totals(&self) -> Result<OrderTotals, ValidationErrors> {
        let mut v = Validator::new();
        let items = self.parse_items(&mut v);
        let shipping = v.money("Shipping amount", &self.shipping_amount);
        let tax = v.money("Tax amount", &self.tax_amount);
        let totals = Self::compute_totals(&mut v, &items, shipping, tax);
        v.finish()?;
        totals.ok_or_else(|| ValidationErrors::single("The submitted data is invalid"))
    }

    /// Validate the whole form.
    ///
    /// # Errors
    ///
    /// Returns every failed check, in form order.
    pub fn validate(&self) -> Result<OrderEdit, ValidationErrors> {
        let mut v = Validator::new();

        let status = OrderStatus::from_str(&self.status).ok();
        v.check(status.is_some(), "Status is invalid");
        let payment_status = PaymentStatus::from_str(&self.payment_status).ok();
        v.check(payment_status.is_some(), "Payment status is invalid");

        let items = self.parse_items(&mut v);
        let shipping_amount = v.money("Shipping amount", &self.shipping_amount);
        let tax_amount = v.money("Tax amount", &self.tax_amount);
        let totals = Self::compute_totals(&mut v, &items, shipping_amount, tax_amount);

        let tracking_number = blank_to_none(&self.tracking_number);
        if let Some(status) = status
            && status.requires_tracking()
        {
            v.check(
                tracking_number.is_some(),
                format!(
                    "Tracking number is required when the order is {}",
                    status.label().to_lowercase()
                ),
            );
        }
        if let Some(tracking) = &tracking_number {
            v.max_len("Tracking number", tracking, MAX_TRACKING_LENGTH);
        }
        v.max_len("Notes", self.notes.trim(), MAX_NOTES_LENGTH);

        let billing_address = Self::parse_address_field(&mut v, "Billing", &self.billing_address);
        let shipping_address =
            Self::parse_address_field(&mut v, "Shipping", &self.shipping_address);

        v.finish()?;

        match (status, payment_status, totals) {
            (Some(status), Some(payment_status), Some(totals)) => {
                Ok(OrderEdit {
                    status,
                    payment_status,
                    items,
                    totals,
                    notes: blank_to_none(&self.notes),
                    tracking_number,
                    billing_address,
                    shipping_address,
                })
            }
            _ => Err(ValidationErrors::single("The submitted data is invalid")),
        }
    }

    /// Totals of the parsed items. Flags an overflowing total; `None` when an
    /// amount is missing.
    fn compute_totals(
        v: &mut Validator,
        items: &[OrderItem],
        shipping: Option<Money>,
        tax: Option<Money>,
    ) -> Option<OrderTotals> {
        let (shipping, tax) = shipping.zip(tax)?;
        let totals = OrderTotals::compute(items, shipping, tax);
        v.check(totals.is_some(), "Order total is too large");
        totals
    }

    fn parse_items(&self, v: &mut Validator) -> Vec<OrderItem> {
        let inputs: Vec<ItemInput> = match serde_json::from_str(&self.order_items) {
            Ok(inputs) => inputs,
            Err(e) => {
                tracing::debug!(error = %e, "Unreadable order items");
                v.push("Order items are invalid");
                return Vec::new();
            }
        };

        if !v.check(!inputs.is_empty(), "Order must have at least one item") {
            return Vec::new();
        }

        let mut items = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let n = index + 1;
            let name_ok = v.required(&format!("Item {n} name"), &input.name);
            let quantity = v.quantity(
                &format!("Item {n} quantity"),
                &value_text(&input.quantity),
                1,
            );
            let unit_price = v.money(
                &format!("Item {n} unit price"),
                &value_text(&input.unit_price),
            );

            let line_ok = match (quantity, unit_price) {
                (Some(quantity), Some(unit_price)) => v.check(
                    unit_price.checked_mul(quantity).is_some(),
                    format!("Item {n} unit price is too large"),
                ),
                _ => false,
            };

            if let (true, true, Some(quantity), Some(unit_price)) =
                (name_ok, line_ok, quantity, unit_price)
            {
                items.push(OrderItem {
                    id: input.id,
                    product_id: input.product_id,
                    name: input.name.trim().to_string(),
                    sku: input.sku.as_deref().and_then(blank_to_none),
                    quantity,
                    unit_price,
                });
            }
        }
        items
    }

    fn parse_address_field(v: &mut Validator, label: &str, raw: &str) -> Option<Address> {
        match parse_address(raw) {
            Ok(Some(address)) => {
                address.validate(label, v);
                Some(address)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Unreadable {label} address");
                v.push(format!("{label} address is invalid"));
                None
            }
        }
    }
}

// =============================================================================
// Ship form
// =============================================================================

/// Submitted ship form.
///
/// Field names are flat (`sender_name`, `shipping_city`, `box_weight`, ...)
/// so the page works as a plain HTML form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipForm {
    pub sender_name: String,
    pub sender_company: String,
    pub sender_phone: String,
    pub sender_address1: String,
    pub sender_address2: String,
    pub sender_city: String,
    pub sender_state: String,
    pub sender_postal_code: String,
    pub sender_country: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping: Address,
    pub box_length: String,
    pub box_width: String,
    pub box_height: String,
    pub dimension_unit: String,
    pub box_weight: String,
    pub weight_unit: String,
    pub service_level: String,
    pub signature_required: bool,
    pub saturday_delivery: bool,
    pub insurance_amount: String,
    pub reference: String,
}

impl ShipForm {
    /// Read the form from submitted fields.
    #[must_use]
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let text = |name: &str| fields.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
        let flag = |name: &str| {
            fields
                .get(name)
                .is_some_and(|v| matches!(v.as_str(), "on" | "true" | "1"))
        };

        Self {
            sender_name: text("sender_name"),
            sender_company: text("sender_company"),
            sender_phone: text("sender_phone"),
            sender_address1: text("sender_address1"),
            sender_address2: text("sender_address2"),
            sender_city: text("sender_city"),
            sender_state: text("sender_state"),
            sender_postal_code: text("sender_postal_code"),
            sender_country: text("sender_country"),
            customer_name: text("customer_name"),
            customer_email: text("customer_email"),
            customer_phone: text("customer_phone"),
            shipping: Address::from_fields(fields, "shipping"),
            box_length: text("box_length"),
            box_width: text("box_width"),
            box_height: text("box_height"),
            dimension_unit: text("dimension_unit"),
            box_weight: text("box_weight"),
            weight_unit: text("weight_unit"),
            service_level: text("service_level"),
            signature_required: flag("signature_required"),
            saturday_delivery: flag("saturday_delivery"),
            insurance_amount: text("insurance_amount"),
            reference: text("reference"),
        }
    }

    /// Prefill from the configured sender and the order's customer and address.
    #[must_use]
    pub fn prefill(order: &Order, ship_from: &ShipFrom) -> Self {
        Self {
            sender_name: ship_from.name.clone(),
            sender_company: ship_from.company.clone().unwrap_or_default(),
            sender_phone: ship_from.phone.clone().unwrap_or_default(),
            sender_address1: ship_from.address1.clone(),
            sender_address2: String::new(),
            sender_city: ship_from.city.clone(),
            sender_state: ship_from.state.clone(),
            sender_postal_code: ship_from.postal_code.clone(),
            sender_country: ship_from.country.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone().unwrap_or_default(),
            shipping: order.shipping_address.clone().unwrap_or_default(),
            dimension_unit: DimensionUnit::default().as_str().to_string(),
            weight_unit: WeightUnit::default().as_str().to_string(),
            service_level: ServiceLevel::default().as_str().to_string(),
            reference: order.order_number.clone(),
            ..Self::default()
        }
    }

    /// Validate the form into a shipment request.
    ///
    /// # Errors
    ///
    /// Returns every failed check, in form order.
    pub fn validate(&self) -> Result<ShipmentRequest, ValidationErrors> {
        let mut v = Validator::new();

        // Sender
        v.required("Sender name", &self.sender_name);
        v.phone("Sender phone", &self.sender_phone);
        v.required("Sender address", &self.sender_address1);
        v.required("Sender city", &self.sender_city);
        v.required("Sender state", &self.sender_state);
        if v.required("Sender postal code", &self.sender_postal_code) {
            v.postal_code("Sender postal code", &self.sender_postal_code);
        }
        v.required("Sender country", &self.sender_country);

        // Customer
        v.required("Customer name", &self.customer_name);
        let email = v.email("Customer email", &self.customer_email);
        v.phone("Customer phone", &self.customer_phone);

        // Destination
        let shipping = self.shipping.clone().normalized();
        shipping.validate("Shipping", &mut v);

        // Box
        let length = dimension(&mut v, "Box length", &self.box_length);
        let width = dimension(&mut v, "Box width", &self.box_width);
        let height = dimension(&mut v, "Box height", &self.box_height);
        let dimension_unit = choice::<DimensionUnit>(
            &mut v,
            &self.dimension_unit,
            "Dimension unit must be in or cm",
        );
        let weight = dimension(&mut v, "Box weight", &self.box_weight);
        let weight_unit = choice::<WeightUnit>(
            &mut v,
            &self.weight_unit,
            "Weight unit must be one of lb, kg, oz, g",
        );

        // Additional settings
        let service_level = choice::<ServiceLevel>(
            &mut v,
            &self.service_level,
            "Service level must be standard, express or overnight",
        );
        let insurance_amount = if self.insurance_amount.trim().is_empty() {
            None
        } else {
            v.money("Insurance amount", &self.insurance_amount)
        };
        v.max_len("Reference", &self.reference, MAX_REFERENCE_LENGTH);

        v.finish()?;

        let (
            Some(email),
            Some(length),
            Some(width),
            Some(height),
            Some(dimension_unit),
            Some(weight),
            Some(weight_unit),
            Some(service_level),
        ) = (
            email,
            length,
            width,
            height,
            dimension_unit,
            weight,
            weight_unit,
            service_level,
        )
        else {
            return Err(ValidationErrors::single("The submitted data is invalid"));
        };

        Ok(ShipmentRequest {
            sender_info: SenderInfo {
                name: self.sender_name.trim().to_string(),
                company: blank_to_none(&self.sender_company),
                phone: blank_to_none(&self.sender_phone),
                address1: self.sender_address1.trim().to_string(),
                address2: blank_to_none(&self.sender_address2),
                city: self.sender_city.trim().to_string(),
                state: self.sender_state.trim().to_string(),
                postal_code: self.sender_postal_code.trim().to_string(),
                country: self.sender_country.trim().to_string(),
            },
            customer_info: CustomerInfo {
                name: self.customer_name.trim().to_string(),
                email: email.into_inner(),
                phone: blank_to_none(&self.customer_phone),
            },
            shipping_address: shipping,
            box_info: BoxInfo {
                length,
                width,
                height,
                dimension_unit,
                weight,
                weight_unit,
            },
            additional_settings: AdditionalSettings {
                service_level,
                signature_required: self.signature_required,
                saturday_delivery: self.saturday_delivery,
                insurance_amount,
                reference: blank_to_none(&self.reference),
            },
        })
    }
}

/// Parse a box measurement, which must be a number greater than zero.
fn dimension(v: &mut Validator, label: &str, raw: &str) -> Option<Decimal> {
    if !v.required(label, raw) {
        return None;
    }
    let Ok(value) = Decimal::from_str(raw.trim()) else {
        v.push(format!("{label} must be a number"));
        return None;
    };
    v.positive(label, value).then_some(value)
}

/// Parse one of a fixed list of choices.
fn choice<T: FromStr>(v: &mut Validator, raw: &str, message: &str) -> Option<T> {
    let parsed = raw.parse::<T>().ok();
    v.check(parsed.is_some(), message);
    parsed
}
