//! Operation-level error taxonomy for the cart controller.

use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

/// Errors returned by cart operations.
///
/// Every variant leaves the cart exactly as it was before the operation
/// began: validation failures are checked before any mutation, and a store
/// failure aborts before the in-memory commit.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested amount or increment exceeds available stock.
    #[error("Requested quantity exceeds available stock")]
    QuantityExceeded,

    /// The product is not in the cart.
    #[error("Product not found in cart")]
    ProductNotFound,

    /// Requested amount is below the minimum of 1.
    #[error("Amount must be at least 1")]
    InvalidAmount,

    /// A catalog or stock lookup failed. Network failures and missing
    /// records are deliberately collapsed into this one signal; callers get
    /// a single generic "operation failed" message.
    #[error("Product lookup failed: {0}")]
    Lookup(#[from] ApiError),

    /// The new cart snapshot could not be persisted.
    #[error("Failed to persist cart: {0}")]
    Store(#[from] StoreError),
}
