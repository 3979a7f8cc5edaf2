//! Product Catalog Service client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, instrument};

use trailhead_core::{Product, ProductId};

use super::{ApiError, ProductCatalog, build_http_client};
use crate::config::CartConfig;

/// How long a catalog record stays cached. Descriptive data (name, price,
/// image) changes rarely compared to stock.
const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1000;

/// HTTP client for the Product Catalog Service.
///
/// Fetches descriptive product records (`GET {base}/products/{id}`) and
/// caches them for five minutes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<ProductId, Product>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CartConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: build_http_client(config)?,
                base_url: config.api_base_url.clone(),
                cache,
            }),
        })
    }
}

#[async_trait]
impl ProductCatalog for CatalogClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = format!("{}/products/{id}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("product {id}")));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let product: Product = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        self.inner.cache.insert(id, product.clone()).await;

        Ok(product)
    }
}
