//! Stock Service client.

use async_trait::async_trait;
use tracing::instrument;

use trailhead_core::{ProductId, StockLevel};

use super::{ApiError, StockService, build_http_client};
use crate::config::CartConfig;

/// HTTP client for the Stock Service.
///
/// Fetches current availability (`GET {base}/stock/{id}`). Responses are
/// never cached: a quantity check against a stale level would let the cart
/// exceed what is actually in stock.
#[derive(Clone)]
pub struct StockClient {
    client: reqwest::Client,
    base_url: String,
}

impl StockClient {
    /// Create a new stock client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CartConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.api_base_url.clone(),
        })
    }
}

#[async_trait]
impl StockService for StockClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn level(&self, id: ProductId) -> Result<StockLevel, ApiError> {
        let url = format!("{}/stock/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("stock record for {id}")));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}
