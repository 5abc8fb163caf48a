//! Toast notifications shown after form submissions.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

/// Message shown when a backend call fails for reasons the user cannot fix.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    /// Error toast carrying the first validation message.
    #[must_use]
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        Self::error(errors.first())
    }

    /// Error toast for network and server failures.
    #[must_use]
    pub fn generic_failure() -> Self {
        Self::error(GENERIC_FAILURE)
    }

    /// CSS class used by the toast partial.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            ToastKind::Success => "toast-success",
            ToastKind::Info => "toast-info",
            ToastKind::Warning => "toast-warning",
            ToastKind::Error => "toast-error",
        }
    }

    /// ARIA role: errors interrupt, everything else is polite.
    #[must_use]
    pub const fn aria_role(&self) -> &'static str {
        match self.kind {
            ToastKind::Error => "alert",
            _ => "status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_validation_uses_first_message() {
        let errors = ValidationErrors::new(vec![
            "Email is required".to_string(),
            "City is required".to_string(),
        ]);
        let toast = Toast::from_validation(&errors);
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Email is required");
        assert_eq!(toast.aria_role(), "alert");
    }

    #[test]
    fn test_css_class() {
        assert_eq!(Toast::success("Saved").css_class(), "toast-success");
        assert_eq!(Toast::generic_failure().message, GENERIC_FAILURE);
    }
}
