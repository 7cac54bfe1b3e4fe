//! OpenSASE Storefront
//!
//! State core shared by the storefront and its admin panel. Everything lives in a
//! local key-value store; views re-derive what they show from it.
//!
//! ## Features
//! - Catalog overlay (seed products, admin edits, admin-added products)
//! - Promotional display ordering with drag-reorder
//! - Shopping cart and checkout into an append-only order log
//! - Admin session with lazy expiry
//! - Custom promotional media
//! - Cross-view change notifications
//! - Keyword shopping assistant

pub mod assistant;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod domain;
pub mod media;
pub mod orders;
pub mod promotion;
pub mod session;
pub mod storage;
pub mod storefront;
pub mod telemetry;

pub use catalog::CatalogStore;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StorefrontConfig;
pub use domain::aggregates::{Cart, CartError, CartLine, OrderRecord, Product, ProductDraft, ProductPatch};
pub use domain::events::{Notifier, Subscription, Topic};
pub use media::{MediaStore, MediaUpload};
pub use orders::OrderLog;
pub use promotion::PromotionStore;
pub use session::{AuthProvider, SessionStore, SharedSecretAuth};
pub use storage::{KeyValueStore, MemoryStore, RedbStore, StorageError};
pub use storefront::Storefront;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Malformed data under key `{key}`: {message}")]
    StorageParse { key: String, message: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid admin password")]
    Auth,

    #[error("Product id {0} is already taken")]
    Conflict(u64),

    #[error("Media rejected: {0}")]
    Media(String),

    #[error("Product {0} not found")]
    NotFound(u64),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self {
        StorefrontError::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

impl From<domain::aggregates::OrderError> for StorefrontError {
    fn from(err: domain::aggregates::OrderError) -> Self {
        StorefrontError::Validation(err.to_string())
    }
}
