//! Custom Askama template filters for admin pages.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Show a dash for blank values in tables and detail lists.
///
/// Usage in templates: `{{ order.carrier.as_deref().unwrap_or("")|or_dash }}`
#[askama::filter_fn]
pub fn or_dash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    Ok(if value.trim().is_empty() {
        "-".to_string()
    } else {
        value
    })
}
