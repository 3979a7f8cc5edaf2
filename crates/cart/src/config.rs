//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TRAILHEAD_API_BASE_URL` - Base URL of the storefront API (catalog and
//!   stock endpoints)
//!
//! ## Optional
//! - `TRAILHEAD_API_TOKEN` - Bearer token for the storefront API
//! - `TRAILHEAD_DATA_DIR` - Directory for durable cart snapshots
//!   (default: `./data`)
//! - `TRAILHEAD_HTTP_TIMEOUT_SECS` - HTTP request timeout in seconds
//!   (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart controller configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CartConfig {
    /// Base URL of the storefront API, without a trailing slash.
    pub api_base_url: String,
    /// Bearer token for the storefront API, if the deployment requires one.
    pub api_token: Option<SecretString>,
    /// Directory holding durable cart snapshots.
    pub data_dir: PathBuf,
    /// Timeout applied to every catalog and stock request.
    pub http_timeout: Duration,
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("data_dir", &self.data_dir)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(
            "TRAILHEAD_API_BASE_URL",
            &get_required_env("TRAILHEAD_API_BASE_URL")?,
        )?;
        let api_token = get_optional_env("TRAILHEAD_API_TOKEN").map(SecretString::from);
        let data_dir = PathBuf::from(get_env_or_default("TRAILHEAD_DATA_DIR", DEFAULT_DATA_DIR));
        let timeout_secs = get_env_or_default("TRAILHEAD_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TRAILHEAD_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_base_url,
            api_token,
            data_dir,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a base URL and normalize it to have no trailing slash.
///
/// Request paths are built with `format!("{base}/stock/{id}")`, so the
/// stored form must not end in `/`.
fn parse_base_url(var_name: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        let base = parse_base_url("TEST_VAR", "https://api.example.com/v1/").unwrap();
        assert_eq!(base, "https://api.example.com/v1");
    }

    #[test]
    fn test_parse_base_url_keeps_path() {
        let base = parse_base_url("TEST_VAR", "http://localhost:3333/api").unwrap();
        assert_eq!(base, "http://localhost:3333/api");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        let result = parse_base_url("TEST_VAR", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_base_url_rejects_non_http_scheme() {
        let result = parse_base_url("TEST_VAR", "ftp://example.com");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_debug_redacts_api_token() {
        let config = CartConfig {
            api_base_url: "https://api.example.com".to_string(),
            api_token: Some(SecretString::from("super_secret_token")),
            data_dir: PathBuf::from("./data"),
            http_timeout: Duration::from_secs(10),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
