//! Integration tests for Trailhead.
//!
//! This crate provides shared in-memory fakes of the cart controller's three
//! collaborators, so the scenario tests in `tests/` can drive a fully wired
//! [`CartService`](trailhead_cart::CartService) without a network or a
//! filesystem.
//!
//! # Test Categories
//!
//! - `cart_operations` - add / remove / update-amount behavior and stock
//!   enforcement
//! - `persistence` - snapshot round-trips, blob format, corruption recovery
//! - `concurrency` - the documented unserialized-operation race

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use trailhead_cart::{ApiError, CartStore, ProductCatalog, StockService, StoreError};
use trailhead_core::{Product, ProductId, StockLevel};

/// Initialize test logging once per process. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trailhead_cart=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Build a catalog record with the conventional test name and image URL.
#[must_use]
pub fn product(id: u64, price: Decimal) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price,
        image_url: format!("https://cdn.example.com/{id}.jpg"),
    }
}

/// In-memory Product Catalog Service.
///
/// Unknown ids fail with [`ApiError::NotFound`], matching the HTTP client's
/// behavior on a 404.
#[derive(Default)]
pub struct FakeCatalog {
    records: Mutex<HashMap<ProductId, Product>>,
}

impl FakeCatalog {
    #[must_use]
    pub fn with(products: impl IntoIterator<Item = Product>) -> Arc<Self> {
        let records = products.into_iter().map(|p| (p.id, p)).collect();
        Arc::new(Self {
            records: Mutex::new(records),
        })
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
    }
}

/// In-memory Stock Service.
///
/// Levels can be adjusted mid-test with [`FakeStock::set`]; unknown ids fail
/// with [`ApiError::NotFound`].
#[derive(Default)]
pub struct FakeStock {
    levels: Mutex<HashMap<ProductId, u32>>,
}

impl FakeStock {
    #[must_use]
    pub fn with(levels: impl IntoIterator<Item = (u64, u32)>) -> Arc<Self> {
        let levels = levels
            .into_iter()
            .map(|(id, amount)| (ProductId::new(id), amount))
            .collect();
        Arc::new(Self {
            levels: Mutex::new(levels),
        })
    }

    /// Replace the available amount for a product.
    pub fn set(&self, id: u64, amount: u32) {
        self.levels.lock().unwrap().insert(ProductId::new(id), amount);
    }
}

#[async_trait]
impl StockService for FakeStock {
    async fn level(&self, id: ProductId) -> Result<StockLevel, ApiError> {
        self.levels
            .lock()
            .unwrap()
            .get(&id)
            .map(|&amount| StockLevel { id, amount })
            .ok_or_else(|| ApiError::NotFound(format!("stock record for {id}")))
    }
}

/// In-memory durable store.
///
/// Shared across controller instances (it is the "disk"): building a second
/// `CartService` over the same `MemoryStore` models a page reload.
#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Raw blob stored under `key`, for asserting on the persisted format.
    #[must_use]
    pub fn blob(&self, key: &str) -> Option<String> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    /// Pre-seed a blob, e.g. a corrupt snapshot.
    pub fn seed(&self, key: &str, blob: &str) {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), blob.to_string());
    }
}

impl CartStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
