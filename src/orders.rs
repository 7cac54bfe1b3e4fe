//! Append-only order log and checkout.

use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::aggregates::{Cart, CustomerInfo, OrderRecord, PaymentOption};
use crate::domain::events::{Notifier, Topic};
use crate::storage::{self, keys, KeyValueStore};
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct OrderLog {
    store: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    shipping_fee: Decimal,
}

impl OrderLog {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Notifier, clock: Arc<dyn Clock>, shipping_fee: Decimal) -> Self {
        Self { store, notifier, clock, shipping_fee }
    }

    /// Validates and appends. Nothing is written when validation fails or the order
    /// id is already in the log. Stored entries this build cannot read are carried
    /// over untouched.
    pub fn append(&self, order: OrderRecord) -> Result<()> {
        order.validate()?;
        let mut entries: Vec<serde_json::Value> = storage::read_value(self.store.as_ref(), keys::ORDERS);
        let id = serde_json::to_value(order.order_id).map_err(crate::StorageError::from)?;
        if entries.iter().any(|entry| entry.get("orderId") == Some(&id)) {
            tracing::warn!(order_id = %order.order_id, "order already recorded");
            return Err(StorefrontError::Validation(format!("order {} is already recorded", order.order_id)));
        }
        entries.push(serde_json::to_value(&order).map_err(crate::StorageError::from)?);
        storage::write_json(self.store.as_ref(), keys::ORDERS, &entries)?;
        tracing::info!(order_id = %order.order_id, total = %order.totals.final_total, "order recorded");
        self.notifier.publish(Topic::OrderPlaced);
        Ok(())
    }

    /// Most recent first. Unreadable records are skipped.
    pub fn list(&self) -> Vec<OrderRecord> {
        let mut orders: Vec<OrderRecord> = storage::read_records(self.store.as_ref(), keys::ORDERS);
        orders.reverse();
        orders.sort_by_key(|o| Reverse(o.timestamp));
        orders
    }

    /// Turns the cart into an order, records it and empties the cart.
    ///
    /// The stored cart is emptied before the order is appended and put back if the
    /// append fails, so an error means no order was recorded.
    pub fn checkout(
        &self,
        cart: &mut Cart,
        customer: CustomerInfo,
        option: PaymentOption,
        receipt_image: Option<String>,
    ) -> Result<OrderRecord> {
        let order = OrderRecord::from_cart(cart, customer, option, self.shipping_fee, receipt_image, self.clock.now())?;
        Cart::new().save(self.store.as_ref())?;
        if let Err(err) = self.append(order.clone()) {
            if let Err(restore) = cart.save(self.store.as_ref()) {
                tracing::error!(error = %restore, "could not restore cart after failed checkout");
            }
            return Err(err);
        }
        cart.clear();
        Ok(order)
    }
}

impl std::fmt::Debug for OrderLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLog").field("shipping_fee", &self.shipping_fee).finish_non_exhaustive()
    }
}
