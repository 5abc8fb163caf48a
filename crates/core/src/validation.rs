//! Presence and format checks for submitted forms.
//!
//! A [`Validator`] collects human readable messages in the order the checks
//! run. Handlers surface the first message as a toast and re-render the form.
//!
//! ```
//! use emporium_core::Validator;
//!
//! let mut v = Validator::new();
//! v.required("Email", "");
//! v.required("First name", "Ada");
//! let errors = v.finish().unwrap_err();
//! assert_eq!(errors.first(), "Email is required");
//! ```

use core::fmt;

use rust_decimal::Decimal;

use crate::types::{Email, Money};

/// Validation failure carrying every message that was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    /// Build from a list of messages.
    ///
    /// An empty list is replaced with a generic message so `first()` always
    /// has something to show.
    #[must_use]
    pub fn new(messages: Vec<String>) -> Self {
        if messages.is_empty() {
            Self(vec!["The submitted data is invalid".to_string()])
        } else {
            Self(messages)
        }
    }

    /// Single-message failure.
    #[must_use]
    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    /// All messages in the order they were produced.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// The message surfaced to the user.
    #[must_use]
    pub fn first(&self) -> &str {
        self.0.first().map_or("", String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first())
    }
}

impl std::error::Error for ValidationErrors {}

/// Accumulates validation messages.
#[derive(Debug, Default)]
pub struct Validator {
    messages: Vec<String>,
}

impl Validator {
    /// Create an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` unless `condition` holds.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> bool {
        if !condition {
            self.messages.push(message.into());
        }
        condition
    }

    /// Record a message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Value must contain a non-whitespace character.
    pub fn required(&mut self, label: &str, value: &str) -> bool {
        self.check(!value.trim().is_empty(), format!("{label} is required"))
    }

    /// Optional value must not exceed `max` characters.
    pub fn max_len(&mut self, label: &str, value: &str, max: usize) -> bool {
        self.check(
            value.chars().count() <= max,
            format!("{label} must be at most {max} characters"),
        )
    }

    /// Value must be present and parse as an [`Email`].
    pub fn email(&mut self, label: &str, value: &str) -> Option<Email> {
        if !self.required(label, value) {
            return None;
        }
        match Email::parse(value) {
            Ok(email) => Some(email),
            Err(_) => {
                self.push(format!("{label} must be a valid email address"));
                None
            }
        }
    }

    /// Phone number format, skipped when the value is blank.
    pub fn phone(&mut self, label: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        self.check(
            is_valid_phone(value),
            format!("{label} must be a valid phone number"),
        )
    }

    /// Postal code format, skipped when the value is blank (pair with `required`).
    pub fn postal_code(&mut self, label: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        self.check(
            is_valid_postal_code(value),
            format!("{label} is not a valid postal code"),
        )
    }

    /// Quantity must be at least `min`.
    pub fn min_quantity(&mut self, label: &str, quantity: i64, min: i64) -> bool {
        self.check(quantity >= min, format!("{label} must be at least {min}"))
    }

    /// Parse a whole-number quantity of at least `min`.
    pub fn quantity(&mut self, label: &str, value: &str, min: u32) -> Option<u32> {
        if !self.required(label, value) {
            return None;
        }
        let Ok(quantity) = value.trim().parse::<i64>() else {
            self.push(format!("{label} must be a whole number"));
            return None;
        };
        if !self.min_quantity(label, quantity, i64::from(min)) {
            return None;
        }
        let parsed = u32::try_from(quantity).ok();
        self.check(parsed.is_some(), format!("{label} is too large"));
        parsed
    }

    /// Parse a money input, requiring it to be present and not negative.
    ///
    /// The amount is rounded to whole cents.
    pub fn money(&mut self, label: &str, value: &str) -> Option<Money> {
        if !self.required(label, value) {
            return None;
        }
        match Money::parse(value) {
            Ok(money) if money.is_negative() => {
                self.push(format!("{label} cannot be negative"));
                None
            }
            Ok(money) => Some(money.to_cents()),
            Err(_) => {
                self.push(format!("{label} must be a valid amount"));
                None
            }
        }
    }

    /// Value must be strictly greater than zero.
    pub fn positive(&mut self, label: &str, value: Decimal) -> bool {
        self.check(value > Decimal::ZERO, format!("{label} must be greater than 0"))
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns every recorded message if any check failed.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.messages))
        }
    }
}

/// 7-20 characters of digits and common separators, with at least 7 digits.
fn is_valid_phone(value: &str) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    allowed && (7..=20).contains(&value.len()) && digits >= 7
}

/// 3-10 characters of letters, digits, spaces or dashes.
fn is_valid_postal_code(value: &str) -> bool {
    (3..=10).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
        && value.chars().any(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_parsing() {
        let mut v = Validator::new();
        assert_eq!(v.quantity("Quantity", " 3 ", 1), Some(3));
        assert_eq!(v.quantity("Quantity", "0", 1), None);
        assert_eq!(v.quantity("Quantity", "two", 1), None);
        assert_eq!(v.quantity("Quantity", "", 1), None);
        let errors = v.finish().unwrap_err();
        assert_eq!(
            errors.messages(),
            [
                "Quantity must be at least 1",
                "Quantity must be a whole number",
                "Quantity is required"
            ]
        );
    }

    #[test]
    fn test_messages_keep_order() {
        let mut v = Validator::new();
        v.required("Email", " ");
        v.required("City", "");
        let errors = v.finish().unwrap_err();
        assert_eq!(
            errors.messages(),
            ["Email is required", "City is required"]
        );
        assert_eq!(errors.to_string(), "Email is required");
    }

    #[test]
    fn test_email_reports_required_before_format() {
        let mut v = Validator::new();
        assert!(v.email("Email", "").is_none());
        assert!(v.email("Email", "nope").is_none());
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.messages()[0], "Email is required");
        assert_eq!(errors.messages()[1], "Email must be a valid email address");
    }

    #[test]
    fn test_phone_and_postal_code() {
        assert!(is_valid_phone("+1 (555) 010-2030"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("555-CALL-NOW"));
        assert!(is_valid_postal_code("94107"));
        assert!(is_valid_postal_code("SW1A 1AA"));
        assert!(!is_valid_postal_code("12"));
        assert!(!is_valid_postal_code("---"));
    }

    #[test]
    fn test_blank_optional_fields_pass() {
        let mut v = Validator::new();
        v.phone("Phone", "  ");
        v.postal_code("Postal code", "");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_money_rejects_negative() {
        let mut v = Validator::new();
        assert!(v.money("Shipping", "-5").is_none());
        assert!(v.money("Tax", "abc").is_none());
        assert_eq!(v.money("Subtotal", "10").unwrap(), Money::from_cents(1000));
        let errors = v.finish().unwrap_err();
        assert_eq!(
            errors.messages(),
            ["Shipping cannot be negative", "Tax must be a valid amount"]
        );
    }

    #[test]
    fn test_money_rounds_to_cents() {
        let mut v = Validator::new();
        let price = v.money("Unit price", "0.333").unwrap();
        assert_eq!(price, Money::from_cents(33));
        assert_eq!(price.amount.scale(), 2);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_positive_and_quantity() {
        let mut v = Validator::new();
        v.positive("Weight", Decimal::ZERO);
        v.min_quantity("Quantity", 0, 1);
        assert_eq!(
            v.finish().unwrap_err().messages(),
            ["Weight must be greater than 0", "Quantity must be at least 1"]
        );
    }

    #[test]
    fn test_empty_errors_still_have_a_message() {
        let errors = ValidationErrors::new(vec![]);
        assert!(!errors.first().is_empty());
    }
}
