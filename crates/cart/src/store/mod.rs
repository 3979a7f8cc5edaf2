//! Durable snapshot storage for the cart.
//!
//! The cart is persisted as a single serialized blob under a fixed namespaced
//! key: every write replaces the whole snapshot, so a reader can never
//! observe a partially-updated cart. [`FileStore`] is the production
//! implementation; tests substitute an in-memory map.

mod file;

pub use file::FileStore;

use thiserror::Error;

/// Key under which the cart snapshot is stored.
pub const CART_KEY: &str = "trailhead:cart";

/// Errors that can occur in the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be serialized.
    #[error("Snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous durable key-value store holding serialized snapshots.
pub trait CartStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the underlying storage fails. A missing
    /// key is `Ok(None)`, not an error.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob stored under `key`.
    ///
    /// The write must be atomic: after a crash the store holds either the
    /// previous snapshot or the new one, never a torn mix.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the underlying storage fails.
    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Io(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "Store I/O error: disk full");
    }
}
