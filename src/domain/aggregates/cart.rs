//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::product::{Product, ProductSnapshot};
use crate::domain::value_objects::ProductId;
use crate::storage::{self, keys, KeyValueStore, StorageError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal { self.product.price * Decimal::from(self.quantity) }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("No cart line for product {0}")]
    LineNotFound(ProductId),
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    /// Restores the persisted cart. Unreadable lines, zero quantities and repeated
    /// product ids are dropped.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut cart = Self::new();
        for line in storage::read_records::<CartLine>(store, keys::CART) {
            if line.quantity == 0 || cart.line(line.product.id).is_some() {
                tracing::warn!(product_id = line.product.id, "dropping invalid cart line");
                continue;
            }
            cart.lines.push(line);
        }
        cart
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        storage::write_json(store, keys::CART, &self.lines)
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> { self.lines.iter().find(|l| l.product.id == product_id) }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Adds one unit. The price is fixed when the line is first created.
    pub fn add(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine { product: product.snapshot(), quantity: 1 }),
        }
    }

    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 { return self.remove(product_id); }
        let line = self.lines.iter_mut().find(|l| l.product.id == product_id).ok_or(CartError::LineNotFound(product_id))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        if self.lines.len() == before { return Err(CartError::LineNotFound(product_id)); }
        Ok(())
    }

    pub fn clear(&mut self) { self.lines.clear(); }

    pub fn total(&self) -> Decimal { self.lines.iter().map(CartLine::line_total).sum() }

    /// Number of units, not lines.
    pub fn count(&self) -> u64 { self.lines.iter().map(|l| u64::from(l.quantity)).sum() }
}
