//! Trailhead Cart - Client-side cart controller.
//!
//! This crate owns the user's cart for a storefront client: it validates
//! every mutation against the remote stock service, mirrors each committed
//! state to a durable local snapshot, and publishes the latest cart value to
//! subscribers (typically the UI layer).
//!
//! # Architecture
//!
//! - [`CartService`] - the controller: add / remove / update-amount
//! - [`api`] - HTTP clients for the catalog and stock services, behind the
//!   [`ProductCatalog`] and [`StockService`] traits
//! - [`store`] - the durable key-value snapshot store, behind [`CartStore`]
//! - [`config`] - environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use trailhead_cart::{CartConfig, CartService};
//! use trailhead_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let cart = CartService::from_config(&config)?;
//!
//! cart.add_product(ProductId::new(10)).await?;
//! let mut updates = cart.subscribe();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use api::{ApiError, CatalogClient, ProductCatalog, StockClient, StockService};
pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use service::CartService;
pub use store::{CART_KEY, CartStore, FileStore, StoreError};
