//! Postal address shared by orders, shipments and checkout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::validation::Validator;

/// A billing or shipping address.
///
/// Field names match the backend payloads. Optional fields are sent as
/// `null` when blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Address {
    /// First and last name joined with a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Single-line rendering for tables (`"1 Main St, Springfield, IL 62701, US"`).
    #[must_use]
    pub fn one_line(&self) -> String {
        let street = match self.address2.as_deref().map(str::trim) {
            Some(line2) if !line2.is_empty() => format!("{} {line2}", self.address1.trim()),
            _ => self.address1.trim().to_string(),
        };
        let region = format!("{} {}", self.state.trim(), self.postal_code.trim());
        [street, self.city.trim().to_string(), region.trim().to_string(), self.country.trim().to_string()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether every field is blank (the address was not filled in at all).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        let optional_blank =
            |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        [
            &self.first_name,
            &self.last_name,
            &self.address1,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
            && optional_blank(&self.company)
            && optional_blank(&self.address2)
            && optional_blank(&self.phone)
    }

    /// Read an address from flat form fields named `{prefix}_{field}`
    /// (`shipping_city`, `shipping_postal_code`, ...). The result is
    /// normalized.
    #[must_use]
    pub fn from_fields(fields: &HashMap<String, String>, prefix: &str) -> Self {
        let get = |name: &str| {
            fields
                .get(&format!("{prefix}_{name}"))
                .cloned()
                .unwrap_or_default()
        };
        Self {
            first_name: get("first_name"),
            last_name: get("last_name"),
            company: Some(get("company")),
            address1: get("address1"),
            address2: Some(get("address2")),
            city: get("city"),
            state: get("state"),
            postal_code: get("postal_code"),
            country: get("country"),
            phone: Some(get("phone")),
        }
        .normalized()
    }

    /// Trim every field and turn blank optional fields into `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.address1,
            &mut self.city,
            &mut self.state,
            &mut self.postal_code,
            &mut self.country,
        ] {
            *field = field.trim().to_string();
        }
        self.company = clean(self.company);
        self.address2 = clean(self.address2);
        self.phone = clean(self.phone);
        self
    }

    /// Validate required fields and formats.
    ///
    /// `prefix` names the address in messages (`"Shipping"` produces
    /// `"Shipping city is required"`).
    pub fn validate(&self, prefix: &str, v: &mut Validator) {
        v.required(&format!("{prefix} first name"), &self.first_name);
        v.required(&format!("{prefix} last name"), &self.last_name);
        v.required(&format!("{prefix} address"), &self.address1);
        v.required(&format!("{prefix} city"), &self.city);
        v.required(&format!("{prefix} state"), &self.state);
        if v.required(&format!("{prefix} postal code"), &self.postal_code) {
            v.postal_code(&format!("{prefix} postal code"), &self.postal_code);
        }
        v.required(&format!("{prefix} country"), &self.country);
        if let Some(phone) = &self.phone {
            v.phone(&format!("{prefix} phone"), phone);
        }
    }
}
