//! Environment configuration shared by the storefront and admin apps.
//!
//! Both apps talk to the same commerce backend, so the connection settings
//! and the secret checks on its API tokens live here. Each app layers its
//! own listen address and page settings on top.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Minimum Shannon entropy for API tokens, in bits per character.
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Values that mark a token as copied from a template (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Default backend request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Commerce backend connection settings.
///
/// `Debug` redacts the API token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Always ends in `/` so relative joins keep any path prefix.
    pub base_url: Url,
    /// Bearer token sent with every request.
    pub api_token: SecretString,
    pub timeout: Duration,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BackendConfig {
    /// Load from `BACKEND_API_URL`, `BACKEND_TIMEOUT_SECS` and the token in
    /// `token_var`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or invalid, or if the token
    /// looks like a placeholder or has too little entropy.
    pub fn from_env(token_var: &str) -> Result<Self, ConfigError> {
        let timeout_secs: u64 = env::parse_or("BACKEND_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        Ok(Self {
            base_url: parse_base_url("BACKEND_API_URL", &env::required("BACKEND_API_URL")?)?,
            api_token: validated_secret(token_var)?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build a config without reading the environment or checking the token.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            api_token: SecretString::from(api_token.to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Environment variable lookups.
pub mod env {
    use std::str::FromStr;

    use super::ConfigError;

    /// A variable that must be set.
    ///
    /// # Errors
    ///
    /// Returns `MissingEnvVar` if it is not set.
    pub fn required(key: &str) -> Result<String, ConfigError> {
        std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// A variable that may be unset; empty counts as unset.
    #[must_use]
    pub fn optional(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    /// A variable with a default.
    #[must_use]
    pub fn or_default(key: &str, default: &str) -> String {
        optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEnvVar` if the value does not parse.
    pub fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        optional(key).map_or(Ok(default), |value| {
            value
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse `key` as `T`, falling back to `default`.
///
/// Shorthand for [`env::parse_or`] with a string default, for values such as
/// IP addresses that have no literal form.
///
/// # Errors
///
/// Returns `InvalidEnvVar` if the value or the default does not parse.
pub fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    env::or_default(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL and make sure it ends with a slash.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let value = value.trim();
    let with_slash = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&with_slash).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let len: u32 = counts.values().sum();
    if len == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / f64::from(len);
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder and low-entropy tokens.
fn check_secret(secret: &str, key: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }
    Ok(())
}

fn validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = env::required(key)?;
    check_secret(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_check_secret() {
        assert!(matches!(
            check_secret("your-token-here", "T"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(check_secret("changeme-admin-token", "T").is_err());
        assert!(check_secret("abababababababab", "T").is_err());
        assert!(check_secret("sk_9fQ2vL7xR4mZ8kP1wB6nT3yH", "T").is_ok());
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("K", "http://backend.internal/api/v1").unwrap();
        assert_eq!(url.as_str(), "http://backend.internal/api/v1/");
        assert_eq!(
            url.join("cart/items").unwrap().as_str(),
            "http://backend.internal/api/v1/cart/items"
        );
        assert!(parse_base_url("K", "not a url").is_err());
    }

    #[test]
    fn test_backend_config_debug_redacts_token() {
        let config = BackendConfig::new("http://localhost:8000", "super_secret_token").unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost:8000/"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let timeout: u64 = env::parse_or("EMPORIUM_TEST_UNSET_TIMEOUT", 7).unwrap();
        assert_eq!(timeout, 7);
        let host: std::net::IpAddr = parse_env("EMPORIUM_TEST_UNSET_HOST", "127.0.0.1").unwrap();
        assert!(host.is_loopback());
    }
}
