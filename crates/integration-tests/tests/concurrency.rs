//! The documented unserialized-operation race.
//!
//! Cart operations are not serialized against each other: each computes its
//! next cart value from a snapshot taken before the stock lookup and commits
//! last-write-wins. Two concurrent adds for the same product can therefore
//! both pass the stock check against the same current amount, and the later
//! commit silently drops one increment.
//!
//! The test below pins that behavior down deterministically so the
//! limitation stays visible. It documents what the controller does today for
//! a single-user client; it is not a guarantee to build on.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;

use trailhead_cart::{ApiError, CartService, StockService};
use trailhead_core::{ProductId, StockLevel};

use trailhead_integration_tests::{FakeCatalog, MemoryStore, init_tracing, product};

/// Stock service whose lookups block until the test releases them, so two
/// in-flight operations can be suspended at the same point.
struct GatedStock {
    amount: u32,
    gate: Semaphore,
    arrivals: AtomicU32,
}

impl GatedStock {
    fn new(amount: u32) -> Arc<Self> {
        Arc::new(Self {
            amount,
            gate: Semaphore::new(0),
            arrivals: AtomicU32::new(0),
        })
    }

    fn arrivals(&self) -> u32 {
        self.arrivals.load(Ordering::SeqCst)
    }

    fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl StockService for GatedStock {
    async fn level(&self, id: ProductId) -> Result<StockLevel, ApiError> {
        self.arrivals.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| ApiError::Parse("gate closed".to_string()))?;
        permit.forget();

        Ok(StockLevel {
            id,
            amount: self.amount,
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_adds_for_same_product_lose_an_increment() {
    init_tracing();
    let stock = GatedStock::new(5);
    let catalog = FakeCatalog::with([product(1, Decimal::new(999, 1))]);
    let store = MemoryStore::new();
    let cart = CartService::new(catalog, Arc::clone(&stock) as Arc<dyn StockService>, store);

    let id = ProductId::new(1);
    let first = {
        let cart = cart.clone();
        tokio::spawn(async move { cart.add_product(id).await })
    };
    let second = {
        let cart = cart.clone();
        tokio::spawn(async move { cart.add_product(id).await })
    };

    // Wait until both operations are suspended inside the stock lookup,
    // having each read the same pre-mutation snapshot.
    while stock.arrivals() < 2 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    stock.release(2);

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // Both calls reported success, but one increment was lost: the later
    // commit overwrote the earlier one. Known limitation of the
    // unserialized design, flagged here on purpose.
    let items = cart.cart();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap().amount, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remove_while_add_is_suspended_is_overwritten() {
    init_tracing();
    let stock = GatedStock::new(5);
    let catalog = FakeCatalog::with([product(1, Decimal::new(999, 1))]);
    let store = MemoryStore::new();
    let cart = CartService::new(catalog, Arc::clone(&stock) as Arc<dyn StockService>, store);

    let id = ProductId::new(1);

    // Seed one line, releasing the single gated lookup it needs.
    let seed = {
        let cart = cart.clone();
        tokio::spawn(async move { cart.add_product(id).await })
    };
    while stock.arrivals() < 1 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    stock.release(1);
    seed.await.unwrap().unwrap();

    // Suspend a second add after it has snapshotted the one-line cart...
    let add = {
        let cart = cart.clone();
        tokio::spawn(async move { cart.add_product(id).await })
    };
    while stock.arrivals() < 2 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    // ...remove the line while the add is in flight...
    cart.remove_product(id).unwrap();
    assert!(cart.cart().is_empty());

    // ...then let the add complete. Its commit is based on the stale
    // snapshot, so the removal is overwritten. Same accepted limitation as
    // above: last write wins.
    stock.release(1);
    add.await.unwrap().unwrap();

    let items = cart.cart();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap().amount, 2);
}
