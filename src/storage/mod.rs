//! Key-value persistence shared by every view.
//!
//! Values are JSON documents stored as strings, one per key. Reads are lenient:
//! a key whose contents do not parse is logged, discarded and treated as empty, so
//! one corrupted entry never breaks rendering of the rest of the storefront.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::{RedbStore, TABLE_STORAGE};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Persisted key names. Both views must agree on them.
pub mod keys {
    pub const ADMIN_PRODUCTS: &str = "adminProducts";
    pub const PRODUCT_EDITS: &str = "originalProductEdits";
    pub const PROMO_ORDER: &str = "promoOrderV1";
    pub const ORDERS: &str = "ordersV1";
    pub const CART: &str = "cartV1";
    pub const ADMIN_AUTHENTICATED: &str = "adminAuthenticated";
    pub const ADMIN_LOGIN_TIME: &str = "adminLoginTime";
    pub const CUSTOM_PROMO_MEDIA: &str = "customPromoMedia";
    pub const CUSTOM_PROMO_MEDIA_URL: &str = "customPromoMediaUrl";
    pub const PROMO_MEDIA_PATH: &str = "promoMediaPath";
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<redb::Error> for StorageError {
    fn from(err: redb::Error) -> Self {
        tracing::error!("redb error: {:?}", err);
        StorageError::Backend(err.to_string())
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Raw string under `key`, with backend failures logged and treated as absent.
pub fn read_raw(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "storage read failed");
            None
        }
    }
}

/// Parse a whole key as one JSON document, falling back to `T::default()`.
pub fn read_value<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    let Some(raw) = read_raw(store, key) else { return T::default() };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            discard(store, key, &err);
            T::default()
        }
    }
}

/// Parse a key holding a JSON array record by record. Records that fail to parse
/// are skipped; a key that is not an array at all is discarded.
pub fn read_records<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let Some(raw) = read_raw(store, key) else { return Vec::new() };
    let values = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(values) => values,
        Err(err) => {
            discard(store, key, &err);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(key, index, error = %err, "skipping unreadable record");
                None
            }
        })
        .collect()
}

pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

fn discard(store: &dyn KeyValueStore, key: &str, err: &serde_json::Error) {
    tracing::warn!(key, error = %err, "discarding malformed stored value");
    if let Err(err) = store.remove(key) {
        tracing::warn!(key, error = %err, "could not discard malformed value");
    }
}
