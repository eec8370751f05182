//! Cart domain types.

use serde::{Deserialize, Serialize};

use mercata_core::{CartId, ProductId, UserId};

/// One line in a cart.
///
/// References a [`Product`](crate::models::Product) by id only; the cart
/// does not own the product lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A shopping cart.
///
/// At most one cart per registered user; anonymous carts carry no owner.
/// Items keep insertion order, and adding a product that is already present
/// accumulates quantity into the existing line instead of appending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: CartId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart, owned when an owner is given.
    #[must_use]
    pub fn new(owner_id: Option<UserId>) -> Self {
        Self {
            id: CartId::generate(),
            owner_id,
            items: Vec::new(),
        }
    }

    /// Merge `quantity` of a product into the cart.
    ///
    /// Accumulates into the existing line when the product is already
    /// present, otherwise appends a new line at the end.
    pub fn add_item(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem {
                product_id,
                quantity,
            });
        }
    }

    /// Remove a product's line from the cart.
    ///
    /// Returns `false` when no line for the product exists.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.product_id != product_id);
        self.items.len() != before
    }
}
