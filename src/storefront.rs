//! Wiring of every store over one shared key-value store.
//!
//! Two `Storefront`s opened on the same storage behave like two browser tabs:
//! each reads through to storage, writes are last-write-wins, and the notifier
//! tells an open view when to refresh.

use std::sync::Arc;

use crate::assistant;
use crate::catalog::{seed, CatalogStore};
use crate::clock::{Clock, SystemClock};
use crate::config::StorefrontConfig;
use crate::domain::aggregates::{Cart, CustomerInfo, OrderRecord, PaymentOption, Product};
use crate::domain::events::Notifier;
use crate::domain::value_objects::ProductId;
use crate::media::MediaStore;
use crate::orders::OrderLog;
use crate::promotion::PromotionStore;
use crate::session::{AuthProvider, SessionStore, SharedSecretAuth};
use crate::storage::{KeyValueStore, MemoryStore, RedbStore};
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct Storefront {
    pub catalog: CatalogStore,
    pub promotions: PromotionStore,
    pub orders: OrderLog,
    pub session: SessionStore,
    pub media: MediaStore,
    store: Arc<dyn KeyValueStore>,
    notifier: Notifier,
}

impl Storefront {
    /// Opens the redb file named in the config with the base seed catalog.
    pub fn open(config: &StorefrontConfig) -> Result<Self> {
        let store = Arc::new(RedbStore::open(&config.db_path)?);
        Ok(Self::builder(store, config).build())
    }

    pub fn in_memory(config: &StorefrontConfig) -> Self {
        Self::builder(Arc::new(MemoryStore::new()), config).build()
    }

    pub fn builder(store: Arc<dyn KeyValueStore>, config: &StorefrontConfig) -> StorefrontBuilder {
        StorefrontBuilder {
            store,
            config: config.clone(),
            notifier: Notifier::new(),
            clock: Arc::new(SystemClock),
            auth: None,
            seed: seed::base_catalog(),
        }
    }

    pub fn notifier(&self) -> &Notifier { &self.notifier }
    pub fn store(&self) -> &Arc<dyn KeyValueStore> { &self.store }

    pub fn cart(&self) -> Cart { Cart::load(self.store.as_ref()) }

    /// Adds one unit of a catalog product to the persisted cart.
    pub fn add_to_cart(&self, id: ProductId) -> Result<Cart> {
        let product = self.catalog.get(id).ok_or(StorefrontError::NotFound(id))?;
        let mut cart = self.cart();
        cart.add(&product);
        cart.save(self.store.as_ref())?;
        Ok(cart)
    }

    pub fn set_cart_quantity(&self, id: ProductId, quantity: u32) -> Result<Cart> {
        let mut cart = self.cart();
        cart.set_quantity(id, quantity)?;
        cart.save(self.store.as_ref())?;
        Ok(cart)
    }

    pub fn remove_from_cart(&self, id: ProductId) -> Result<Cart> {
        let mut cart = self.cart();
        cart.remove(id)?;
        cart.save(self.store.as_ref())?;
        Ok(cart)
    }

    pub fn clear_cart(&self) -> Result<()> {
        Ok(Cart::new().save(self.store.as_ref())?)
    }

    pub fn checkout(&self, customer: CustomerInfo, option: PaymentOption, receipt_image: Option<String>) -> Result<OrderRecord> {
        let mut cart = self.cart();
        self.orders.checkout(&mut cart, customer, option, receipt_image)
    }

    /// Products for the promotional grid.
    pub fn featured(&self) -> Vec<Product> { self.promotions.displayed() }

    pub fn ask(&self, message: &str) -> String {
        assistant::respond(message, &self.catalog.effective_catalog())
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("catalog", &self.catalog)
            .field("session", &self.session)
            .field("media", &self.media)
            .finish_non_exhaustive()
    }
}

pub struct StorefrontBuilder {
    store: Arc<dyn KeyValueStore>,
    config: StorefrontConfig,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    auth: Option<Arc<dyn AuthProvider>>,
    seed: Vec<Product>,
}

impl StorefrontBuilder {
    /// Share a notifier with other views in the same process.
    pub fn notifier(mut self, notifier: Notifier) -> Self { self.notifier = notifier; self }
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self { self.clock = clock; self }
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self { self.auth = Some(auth); self }
    pub fn seed(mut self, seed: Vec<Product>) -> Self { self.seed = seed; self }

    pub fn build(self) -> Storefront {
        let Self { store, config, notifier, clock, auth, seed } = self;
        let auth = auth.unwrap_or_else(|| Arc::new(SharedSecretAuth::new(config.admin_secret.clone())) as Arc<dyn AuthProvider>);
        let catalog = CatalogStore::new(store.clone(), notifier.clone(), clock.clone(), seed);
        Storefront {
            promotions: PromotionStore::new(store.clone(), notifier.clone(), catalog.clone()),
            orders: OrderLog::new(store.clone(), notifier.clone(), clock.clone(), config.shipping_fee),
            session: SessionStore::new(store.clone(), clock, auth, config.session_lifetime()),
            media: MediaStore::new(store.clone(), notifier.clone(), &config),
            catalog,
            store,
            notifier,
        }
    }
}

impl std::fmt::Debug for StorefrontBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontBuilder").field("seed", &self.seed.len()).finish_non_exhaustive()
    }
}
