//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Product, ProductDraft, ProductPatch, ProductSnapshot};
pub use order::{CustomerInfo, OrderError, OrderItem, OrderRecord, OrderTotals, PaymentInfo, PaymentOption};
pub use cart::{Cart, CartError, CartLine};
