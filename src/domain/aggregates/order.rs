//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};
use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::{OrderId, ProductId};

/// Checkout transaction. Immutable once appended to the log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub timestamp: DateTime<Utc>,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub payment: PaymentInfo,
    pub totals: OrderTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerInfo {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "phone number is not valid"))]
    pub phone: String,
    #[validate(custom = "not_blank")]
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentOption {
    #[default]
    CashOnDelivery,
    BankTransfer,
    MobileMoney,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub option: PaymentOption,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    pub final_total: Decimal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
    #[error("invalid customer details: {0}")]
    InvalidCustomer(String),
}

impl OrderRecord {
    /// Builds an order from the cart's current lines at `now`.
    pub fn from_cart(
        cart: &Cart,
        customer: CustomerInfo,
        option: PaymentOption,
        shipping: Decimal,
        receipt_image: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        let items: Vec<OrderItem> = cart
            .lines()
            .iter()
            .map(|l| OrderItem { id: l.product.id, name: l.product.name.clone(), quantity: l.quantity, price: l.product.price })
            .collect();
        let subtotal = cart.total();
        let final_total = subtotal + shipping;
        let order = Self {
            order_id: OrderId::generate(),
            timestamp: now,
            customer,
            items,
            payment: PaymentInfo { option, amount: final_total },
            totals: OrderTotals { subtotal, shipping, final_total },
            receipt_image,
        };
        order.validate()?;
        Ok(order)
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        self.customer.validate().map_err(|e| OrderError::InvalidCustomer(e.to_string()))?;
        if self.items.is_empty() || self.items.iter().all(|i| i.quantity == 0) {
            return Err(OrderError::NoItems);
        }
        Ok(())
    }

    pub fn item_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity)).sum() }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(ValidationError::new("blank")); }
    Ok(())
}
