//! Monetary amounts using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Money`] amount from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input string is empty.
    #[error("amount cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol used in front of formatted amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

/// A monetary amount with currency information.
///
/// Amounts are held in the currency's standard unit (dollars, not cents).
/// On the wire a `Money` is just its decimal amount as a string (`"12.50"`);
/// the store runs in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money {
    /// Decimal amount.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in USD.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, CurrencyCode::USD)
    }

    /// Create a USD amount from integer cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    /// Parse a user-entered amount such as `"12.5"` or `"$1,299.00"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or not a decimal number.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches(['$', '€', '£'])
            .chars()
            .filter(|c| *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err(MoneyError::Empty);
        }

        Decimal::from_str(&cleaned)
            .map(|amount| Self::new(amount, CurrencyCode::USD))
            .map_err(|_| MoneyError::Invalid(input.trim().to_owned()))
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Amount rounded half away from zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// The same amount rounded to whole cents.
    #[must_use]
    pub fn to_cents(self) -> Self {
        Self::new(self.rounded(), self.currency_code)
    }

    /// Sum of two amounts, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.amount
            .checked_add(rhs.amount)
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Amount times a quantity, or `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Plain decimal string with two places, suitable for form inputs.
    #[must_use]
    pub fn input_value(&self) -> String {
        format!("{:.2}", self.rounded())
    }

    /// Format for display (e.g., `"$1,299.00"`).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.rounded();
        let plain = format!("{:.2}", rounded.abs());
        let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{}{grouped}.{cents}", self.currency_code.symbol())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.rounded()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_symbols_and_separators() {
        assert_eq!(Money::parse("12.5").unwrap(), Money::from_cents(1250));
        assert_eq!(Money::parse(" $1,299.00 ").unwrap(), Money::from_cents(129_900));
        assert_eq!(Money::parse("0").unwrap(), Money::zero());
    }

    #[test]
    fn test_parse_rejects_blank_and_garbage() {
        assert_eq!(Money::parse("   "), Err(MoneyError::Empty));
        assert!(matches!(Money::parse("ten"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_cents(129_900).display(), "$1,299.00");
        assert_eq!(Money::from_cents(5).display(), "$0.05");
        assert_eq!(Money::from_cents(123_456_789).display(), "$1,234,567.89");
        assert_eq!(Money::from_cents(-2500).display(), "-$25.00");
    }

    #[test]
    fn test_line_arithmetic() {
        let unit = Money::parse("19.99").unwrap();
        let line = unit.checked_mul(3).unwrap();
        assert_eq!(line.input_value(), "59.97");

        let total = Money::from_cents(100)
            .checked_add(Money::from_cents(250))
            .unwrap();
        assert_eq!(total, Money::from_cents(350));
    }

    #[test]
    fn test_arithmetic_overflow_is_none() {
        let huge = Money::from(Decimal::MAX);
        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(Money::from_cents(100)), None);
        assert_eq!(huge.checked_mul(1), Some(huge));
    }

    #[test]
    fn test_to_cents_rounds_half_away_from_zero() {
        assert_eq!(Money::parse("0.333").unwrap().to_cents(), Money::from_cents(33));
        assert_eq!(Money::parse("0.125").unwrap().to_cents(), Money::from_cents(13));
        assert_eq!(Money::parse("4.5").unwrap().to_cents().input_value(), "4.50");
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::parse("-1").unwrap().is_negative());
        assert!(!Money::zero().is_negative());
    }

    #[test]
    fn test_wire_format_is_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(1050)).unwrap();
        assert_eq!(json, "\"10.50\"");

        let from_number: Money = serde_json::from_str("12.5").unwrap();
        let from_string: Money = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(from_number, from_string);
    }
}
