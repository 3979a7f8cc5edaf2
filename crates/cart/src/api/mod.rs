//! Remote storefront API clients.
//!
//! The cart controller never talks to the network directly; it goes through
//! the [`ProductCatalog`] and [`StockService`] traits so tests can substitute
//! in-memory fakes. The production implementations here speak JSON over HTTP:
//!
//! - [`CatalogClient`] - `GET {base}/products/{id}`, responses cached via
//!   `moka` (catalog records are descriptive and change rarely)
//! - [`StockClient`] - `GET {base}/stock/{id}`, never cached (validation must
//!   observe current availability)

mod catalog;
mod stock;

pub use catalog::CatalogClient;
pub use stock::StockClient;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use trailhead_core::{Product, ProductId, StockLevel};

use crate::config::CartConfig;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Record not found for the requested id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read-only lookup of descriptive product records.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch the catalog record for a product.
    async fn product(&self, id: ProductId) -> Result<Product, ApiError>;
}

/// Read-only lookup of available stock.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the current availability for a product.
    async fn level(&self, id: ProductId) -> Result<StockLevel, ApiError>;
}

/// Build the shared HTTP client from configuration.
///
/// The bearer token, if configured, is attached to every request via default
/// headers, as is the request timeout.
fn build_http_client(config: &CartConfig) -> Result<reqwest::Client, ApiError> {
    let mut headers = HeaderMap::new();

    if let Some(token) = &config.api_token {
        let auth_value = format!("Bearer {}", token.expose_secret());
        let mut value = HeaderValue::from_str(&auth_value)
            .map_err(|e| ApiError::Parse(format!("Invalid API token format: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.http_timeout)
        .build()?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = ApiError::Api {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");
    }
}
