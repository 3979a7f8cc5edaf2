//! Cart line items and cart arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, ProductId};

/// A single line of the cart: a product plus the quantity the user intends
/// to purchase.
///
/// Invariant: `amount >= 1`. An item whose amount would reach 0 is removed
/// from the cart by the controller, never retained at 0. Field names are
/// camelCase on the wire so the persisted snapshot matches the catalog API's
/// casing (`imageUrl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
    pub amount: u32,
}

impl CartItem {
    /// Create a cart item for a product just added to the cart.
    #[must_use]
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            image_url: product.image_url,
            amount: 1,
        }
    }

    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

/// Sum of all line subtotals.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::subtotal).sum()
}
