//! Trailhead Core - Shared types library.
//!
//! This crate provides the cart and catalog data model used across all
//! Trailhead components:
//! - `cart` - Cart controller library (stock validation, durable snapshots)
//! - `integration-tests` - Cross-crate scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, catalog records, cart items, and cart arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
