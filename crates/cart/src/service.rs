//! The cart controller.
//!
//! [`CartService`] owns the in-memory cart, validates every mutation against
//! the stock service, and mirrors each committed state to the durable store.
//!
//! # Persistence discipline
//!
//! Mutations are persist-then-commit: the next cart value is written to the
//! store before the in-memory state is replaced and subscribers are
//! notified. A store failure therefore aborts the operation with memory and
//! disk still consistent.
//!
//! # Concurrency
//!
//! Operations are not serialized against each other. Each computes its next
//! cart value from a snapshot taken before any remote lookup and commits
//! last-write-wins, so two concurrent `add_product` calls for the same id
//! can drop one increment. Acceptable for a single-user client; see the
//! concurrency tests in the integration suite.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use trailhead_core::{CartItem, ProductId};

use crate::api::{CatalogClient, ProductCatalog, StockClient, StockService};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::store::{CART_KEY, CartStore, FileStore, StoreError};

/// Client-side cart controller.
///
/// Cheaply cloneable via `Arc`; all clones share the same cart.
#[derive(Clone)]
pub struct CartService {
    inner: Arc<CartServiceInner>,
}

struct CartServiceInner {
    catalog: Arc<dyn ProductCatalog>,
    stock: Arc<dyn StockService>,
    store: Arc<dyn CartStore>,
    cart: Mutex<Vec<CartItem>>,
    watch_tx: watch::Sender<Vec<CartItem>>,
}

impl CartService {
    /// Create a controller over the given collaborators.
    ///
    /// The cart is seeded from the store's persisted snapshot. A missing,
    /// unreadable, or corrupt snapshot seeds an empty cart; it is logged and
    /// never fatal.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockService>,
        store: Arc<dyn CartStore>,
    ) -> Self {
        let cart = Self::load_snapshot(store.as_ref());
        let (watch_tx, _) = watch::channel(cart.clone());

        Self {
            inner: Arc::new(CartServiceInner {
                catalog,
                stock,
                store,
                cart: Mutex::new(cart),
                watch_tx,
            }),
        }
    }

    /// Create a controller wired to the production HTTP clients and file
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build or the data
    /// directory cannot be created.
    pub fn from_config(config: &CartConfig) -> Result<Self, CartError> {
        let catalog = CatalogClient::new(config)?;
        let stock = StockClient::new(config)?;
        let store = FileStore::open(config.data_dir.clone())?;

        Ok(Self::new(Arc::new(catalog), Arc::new(stock), Arc::new(store)))
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Vec<CartItem> {
        self.lock_cart().clone()
    }

    /// Subscribe to committed cart values.
    ///
    /// The receiver always holds the latest committed snapshot; only
    /// validated states are ever published.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.inner.watch_tx.subscribe()
    }

    /// Add one unit of a product to the cart.
    ///
    /// Increments the existing line, or fetches the catalog record and
    /// appends a new line with amount 1.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityExceeded`] if the increment would exceed
    /// available stock, [`CartError::Lookup`] if either remote lookup fails,
    /// or [`CartError::Store`] if the new snapshot cannot be persisted. The
    /// cart is unchanged on any failure.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let snapshot = self.cart();
        let current = snapshot
            .iter()
            .find(|item| item.id == product_id)
            .map_or(0, |item| item.amount);

        let stock = self.inner.stock.level(product_id).await?;
        if current + 1 > stock.amount {
            return Err(CartError::QuantityExceeded);
        }

        let next = if current > 0 {
            snapshot
                .into_iter()
                .map(|mut item| {
                    if item.id == product_id {
                        item.amount += 1;
                    }
                    item
                })
                .collect()
        } else {
            let product = self.inner.catalog.product(product_id).await?;
            let mut next = snapshot;
            next.push(CartItem::from_product(product));
            next
        };

        self.commit(next)
    }

    /// Remove a product's line from the cart entirely.
    ///
    /// This is a whole-line removal, not a decrement. No remote lookups are
    /// involved, so the only transient failure mode is the store write.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] if the product is not in the
    /// cart, or [`CartError::Store`] if the new snapshot cannot be
    /// persisted.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let snapshot = self.cart();
        if !snapshot.iter().any(|item| item.id == product_id) {
            return Err(CartError::ProductNotFound);
        }

        let next = snapshot
            .into_iter()
            .filter(|item| item.id != product_id)
            .collect();

        self.commit(next)
    }

    /// Set a cart line's amount to exactly `amount`.
    ///
    /// Absolute-set semantics: the requested value replaces the previous
    /// amount, it is not added to it. Updating a product that is not in the
    /// cart is a silent no-op - an intentional asymmetry with
    /// [`Self::remove_product`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidAmount`] for amount 0 (checked before any
    /// remote call), [`CartError::QuantityExceeded`] when the request
    /// exceeds stock, [`CartError::Lookup`] if the stock lookup fails, or
    /// [`CartError::Store`] if the new snapshot cannot be persisted.
    #[instrument(skip(self), fields(product_id = %product_id, amount))]
    pub async fn update_amount(&self, product_id: ProductId, amount: u32) -> Result<(), CartError> {
        if amount == 0 {
            return Err(CartError::InvalidAmount);
        }

        let stock = self.inner.stock.level(product_id).await?;
        if amount > stock.amount {
            return Err(CartError::QuantityExceeded);
        }

        let snapshot = self.cart();
        if !snapshot.iter().any(|item| item.id == product_id) {
            debug!("Product not in cart, ignoring amount update");
            return Ok(());
        }

        let next = snapshot
            .into_iter()
            .map(|mut item| {
                if item.id == product_id {
                    item.amount = amount;
                }
                item
            })
            .collect();

        self.commit(next)
    }

    /// Re-persist the current cart.
    ///
    /// Every successful mutation already persists, so this exists for
    /// explicit teardown paths that want a final write.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the write fails.
    pub fn flush(&self) -> Result<(), CartError> {
        let snapshot = self.cart();
        let blob = serde_json::to_string(&snapshot).map_err(StoreError::from)?;
        self.inner.store.write(CART_KEY, &blob)?;
        Ok(())
    }

    /// Persist `next`, then replace the in-memory cart and notify
    /// subscribers. Nothing is modified if the write fails.
    fn commit(&self, next: Vec<CartItem>) -> Result<(), CartError> {
        let blob = serde_json::to_string(&next).map_err(StoreError::from)?;
        self.inner.store.write(CART_KEY, &blob)?;

        *self.lock_cart() = next.clone();
        self.inner.watch_tx.send_replace(next);
        Ok(())
    }

    fn load_snapshot(store: &dyn CartStore) -> Vec<CartItem> {
        match store.read(CART_KEY) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "Persisted cart is corrupt, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                Vec::new()
            }
        }
    }

    fn lock_cart(&self) -> MutexGuard<'_, Vec<CartItem>> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
