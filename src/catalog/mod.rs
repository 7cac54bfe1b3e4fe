//! Catalog store
//!
//! The effective catalog is never stored. It is rebuilt on every read from three
//! layers: the seed list, edit records that shadow seed products by id, and
//! admin-added products whose ids sit above every seed id.

pub mod seed;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use validator::Validate;

use crate::clock::Clock;
use crate::domain::aggregates::{Product, ProductDraft, ProductPatch};
use crate::domain::events::{Notifier, Topic};
use crate::domain::value_objects::ProductId;
use crate::storage::{self, keys, KeyValueStore};
use crate::{Result, StorefrontError};

const MAX_ID_ATTEMPTS: u64 = 5;

/// Merge seed, edits and added records into one list with unique ids.
///
/// Seed order is preserved with edits substituted in place; added records follow
/// in stored order. Records that break the id invariants (duplicates, added
/// records reusing a seed id, edits for unknown ids) are resolved and logged.
pub fn resolve(seed: &[Product], edits: Vec<Product>, added: Vec<Product>) -> Vec<Product> {
    let seed_ids: HashSet<ProductId> = seed.iter().map(|p| p.id).collect();
    let mut overrides: HashMap<ProductId, Product> = HashMap::new();

    for edit in edits {
        if !seed_ids.contains(&edit.id) {
            tracing::warn!(id = edit.id, "ignoring edit record for a non-seed product");
            continue;
        }
        let id = edit.id;
        if overrides.insert(id, edit).is_some() {
            tracing::warn!(id, "duplicate edit records, keeping the latest");
        }
    }

    let mut appended = Vec::new();
    let mut appended_ids = HashSet::new();
    for record in added {
        if seed_ids.contains(&record.id) {
            tracing::warn!(id = record.id, "added record reuses a seed id, shadowing the seed");
            overrides.entry(record.id).or_insert(record);
        } else if !appended_ids.insert(record.id) {
            tracing::warn!(id = record.id, "duplicate added record dropped");
        } else {
            appended.push(record);
        }
    }

    seed.iter()
        .map(|p| overrides.remove(&p.id).unwrap_or_else(|| p.clone()))
        .chain(appended)
        .collect()
}

#[derive(Clone)]
pub struct CatalogStore {
    store: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    seed: Arc<[Product]>,
}

impl CatalogStore {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Notifier, clock: Arc<dyn Clock>, seed: Vec<Product>) -> Self {
        Self { store, notifier, clock, seed: seed.into() }
    }

    pub fn seed(&self) -> &[Product] { &self.seed }
    pub fn seed_max(&self) -> ProductId { seed::seed_max(&self.seed) }
    pub fn is_seed(&self, id: ProductId) -> bool { self.seed.iter().any(|p| p.id == id) }

    pub fn effective_catalog(&self) -> Vec<Product> {
        resolve(&self.seed, self.edits(), self.added())
    }

    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.effective_catalog().into_iter().find(|p| p.id == id)
    }

    /// Applies a partial update. Seed products get an edit record; admin-added
    /// products are updated in place.
    pub fn apply_edit(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        let updated = if self.is_seed(id) {
            let mut product = self.get(id).ok_or(StorefrontError::NotFound(id))?;
            patch.apply(&mut product);
            product.validate()?;
            let mut edits = self.edits();
            upsert(&mut edits, product.clone());
            storage::write_json(self.store.as_ref(), keys::PRODUCT_EDITS, &edits)?;
            product
        } else {
            let mut added = self.added();
            let slot = added.iter_mut().find(|p| p.id == id).ok_or(StorefrontError::NotFound(id))?;
            let mut product = slot.clone();
            patch.apply(&mut product);
            product.validate()?;
            *slot = product.clone();
            storage::write_json(self.store.as_ref(), keys::ADMIN_PRODUCTS, &added)?;
            product
        };
        tracing::info!(id, "product edited");
        self.notifier.publish(Topic::CatalogChanged);
        Ok(updated)
    }

    pub fn set_hidden_on_home(&self, id: ProductId, hidden: bool) -> Result<Product> {
        self.apply_edit(id, ProductPatch::hide_on_home(hidden))
    }

    /// Adds a product and returns its id, which is greater than every id in the
    /// effective catalog. A colliding id is regenerated a few times before giving up.
    pub fn add_product(&self, draft: ProductDraft) -> Result<ProductId> {
        let template = draft.into_product(0);
        template.validate()?;

        let mut last = 0;
        for attempt in 0..MAX_ID_ATTEMPTS {
            let id = self.next_id(attempt)?;
            last = id;
            match self.insert_added(Product { id, ..template.clone() }) {
                Ok(()) => {
                    tracing::info!(id, name = %template.name, "product added");
                    self.notifier.publish(Topic::CatalogChanged);
                    return Ok(id);
                }
                Err(StorefrontError::Conflict(id)) => {
                    tracing::warn!(id, attempt, "product id collision, regenerating");
                }
                Err(err) => return Err(err),
            }
        }
        Err(StorefrontError::Conflict(last))
    }

    /// Removes any overlay record with this id. Seed products fall back to their
    /// base version. Returns whether anything was removed.
    pub fn remove_product(&self, id: ProductId) -> Result<bool> {
        let mut edits = self.edits();
        let mut added = self.added();
        let (edits_before, added_before) = (edits.len(), added.len());
        edits.retain(|p| p.id != id);
        added.retain(|p| p.id != id);

        if edits.len() != edits_before {
            storage::write_json(self.store.as_ref(), keys::PRODUCT_EDITS, &edits)?;
        }
        if added.len() != added_before {
            storage::write_json(self.store.as_ref(), keys::ADMIN_PRODUCTS, &added)?;
        }
        let removed = edits.len() != edits_before || added.len() != added_before;
        if removed {
            tracing::info!(id, seed = self.is_seed(id), "product overlay removed");
            self.notifier.publish(Topic::CatalogChanged);
        }
        Ok(removed)
    }

    fn edits(&self) -> Vec<Product> { storage::read_records(self.store.as_ref(), keys::PRODUCT_EDITS) }
    fn added(&self) -> Vec<Product> { storage::read_records(self.store.as_ref(), keys::ADMIN_PRODUCTS) }

    /// Fails with `Conflict` once the id space above the current maximum is used up.
    fn next_id(&self, attempt: u64) -> Result<ProductId> {
        let max_id = self.effective_catalog().iter().map(|p| p.id).max().unwrap_or(0).max(self.seed_max());
        let floor = max_id.checked_add(1).ok_or_else(|| {
            tracing::warn!(max_id, "no product id left above the stored maximum");
            StorefrontError::Conflict(max_id)
        })?;
        let millis = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        Ok(millis.saturating_add(attempt).max(floor))
    }

    fn insert_added(&self, product: Product) -> Result<()> {
        let mut added = self.added();
        if self.is_seed(product.id) || added.iter().any(|p| p.id == product.id) {
            return Err(StorefrontError::Conflict(product.id));
        }
        added.push(product);
        storage::write_json(self.store.as_ref(), keys::ADMIN_PRODUCTS, &added)?;
        Ok(())
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore").field("seed", &self.seed.len()).finish_non_exhaustive()
    }
}

fn upsert(records: &mut Vec<Product>, product: Product) {
    match records.iter_mut().find(|p| p.id == product.id) {
        Some(slot) => *slot = product,
        None => records.push(product),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use crate::storage::StorageError;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    fn seed5() -> Vec<Product> {
        (1..=5).map(|id| ProductDraft::new(format!("Seed {id}"), Decimal::new(10 * id as i64, 0)).into_product(id)).collect()
    }

    fn catalog() -> (CatalogStore, Arc<MemoryStore>, Notifier) {
        let store = Arc::new(MemoryStore::new());
        let notifier = Notifier::new();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
        (CatalogStore::new(store.clone(), notifier.clone(), clock, seed5()), store, notifier)
    }

    fn ids(products: &[Product]) -> Vec<ProductId> { products.iter().map(|p| p.id).collect() }

    /// Simulates another view adding a product between id generation and insert.
    /// Every second read of `adminProducts` is the insert-time check; the first
    /// `collisions` of those find a record holding the id just generated.
    struct RacingStore {
        inner: MemoryStore,
        reads: AtomicU64,
        first_id: ProductId,
        collisions: u64,
    }

    impl RacingStore {
        fn new(first_id: ProductId, collisions: u64) -> Self {
            Self { inner: MemoryStore::new(), reads: AtomicU64::new(0), first_id, collisions }
        }
    }

    impl KeyValueStore for RacingStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            if key == keys::ADMIN_PRODUCTS {
                let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
                let attempt = read / 2;
                if read % 2 == 0 && attempt <= self.collisions {
                    let mut added: Vec<Product> = storage::read_records(&self.inner, key);
                    added.push(ProductDraft::new("Other view", Decimal::ONE).into_product(self.first_id + attempt - 1));
                    storage::write_json(&self.inner, key, &added)?;
                }
            }
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> { self.inner.set(key, value) }
        fn remove(&self, key: &str) -> std::result::Result<(), StorageError> { self.inner.remove(key) }
    }

    fn racing_catalog(collisions: u64) -> (CatalogStore, ProductId) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let first_id = now.timestamp_millis() as u64;
        let store = Arc::new(RacingStore::new(first_id, collisions));
        (CatalogStore::new(store, Notifier::new(), Arc::new(ManualClock::new(now)), seed5()), first_id)
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let (catalog, _, _) = catalog();
        let id = catalog.add_product(ProductDraft::new("X", Decimal::new(7, 0))).unwrap();
        assert!(id > 5);
        assert_eq!(catalog.effective_catalog().len(), 6);
        assert!(catalog.remove_product(id).unwrap());
        assert_eq!(ids(&catalog.effective_catalog()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_added_ids_strictly_increase() {
        let (catalog, _, _) = catalog();
        let a = catalog.add_product(ProductDraft::new("A", Decimal::ONE)).unwrap();
        // Same clock reading: the id still has to move past `a`.
        let b = catalog.add_product(ProductDraft::new("B", Decimal::ONE)).unwrap();
        assert!(b > a);
        assert_eq!(ids(&catalog.effective_catalog()), vec![1, 2, 3, 4, 5, a, b]);
    }

    #[test]
    fn test_colliding_id_is_regenerated() {
        let (catalog, first_id) = racing_catalog(1);
        let id = catalog.add_product(ProductDraft::new("Mine", Decimal::ONE)).unwrap();
        assert_eq!(id, first_id + 1);
        let effective = catalog.effective_catalog();
        assert_eq!(ids(&effective), vec![1, 2, 3, 4, 5, first_id, first_id + 1]);
        assert_eq!(effective[6].name, "Mine");
    }

    #[test]
    fn test_conflict_after_repeated_collisions() {
        let (catalog, first_id) = racing_catalog(MAX_ID_ATTEMPTS);
        let err = catalog.add_product(ProductDraft::new("Mine", Decimal::ONE)).unwrap_err();
        assert!(matches!(err, StorefrontError::Conflict(id) if id == first_id + MAX_ID_ATTEMPTS - 1));
        assert!(catalog.effective_catalog().iter().all(|p| p.name != "Mine"));
    }

    #[test]
    fn test_exhausted_id_space_is_a_conflict() {
        let (catalog, store, _) = catalog();
        store.set(keys::ADMIN_PRODUCTS, r#"[{"id":18446744073709551615,"name":"Corrupt","price":1}]"#).unwrap();
        let err = catalog.add_product(ProductDraft::new("Z", Decimal::ONE)).unwrap_err();
        assert!(matches!(err, StorefrontError::Conflict(u64::MAX)));
        assert_eq!(ids(&catalog.effective_catalog()), vec![1, 2, 3, 4, 5, u64::MAX]);
    }

    #[test]
    fn test_edit_seed_keeps_position_and_latest_value() {
        let (catalog, _, _) = catalog();
        catalog.apply_edit(3, ProductPatch { name: Some("First".into()), ..ProductPatch::default() }).unwrap();
        catalog.apply_edit(3, ProductPatch { price: Some(Decimal::new(99, 0)), ..ProductPatch::default() }).unwrap();
        let effective = catalog.effective_catalog();
        assert_eq!(ids(&effective), vec![1, 2, 3, 4, 5]);
        assert_eq!(effective[2].name, "First");
        assert_eq!(effective[2].price, Decimal::new(99, 0));
    }

    #[test]
    fn test_remove_seed_restores_base() {
        let (catalog, _, _) = catalog();
        catalog.set_hidden_on_home(2, true).unwrap();
        assert!(catalog.get(2).unwrap().hidden_on_home);
        assert!(catalog.remove_product(2).unwrap());
        assert_eq!(catalog.get(2).unwrap(), seed5()[1]);
        assert!(!catalog.remove_product(2).unwrap());
        assert!(!catalog.remove_product(4242).unwrap());
    }

    #[test]
    fn test_edit_added_product_in_place() {
        let (catalog, _, _) = catalog();
        let id = catalog.add_product(ProductDraft::new("Belt", Decimal::new(20, 0))).unwrap();
        catalog.apply_edit(id, ProductPatch { in_stock: Some(false), ..ProductPatch::default() }).unwrap();
        let belt = catalog.get(id).unwrap();
        assert!(!belt.in_stock);
        assert_eq!(catalog.effective_catalog().len(), 6);
    }

    #[test]
    fn test_edit_errors() {
        let (catalog, _, _) = catalog();
        assert!(matches!(catalog.apply_edit(99, ProductPatch::default()), Err(StorefrontError::NotFound(99))));
        let bad = ProductPatch { discount: Some(150), ..ProductPatch::default() };
        assert!(matches!(catalog.apply_edit(1, bad), Err(StorefrontError::Validation(_))));
        assert_eq!(catalog.get(1).unwrap().discount, 0);
        assert!(matches!(catalog.add_product(ProductDraft::new("  ", Decimal::ONE)), Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_corrupted_overlay_is_deduplicated() {
        let (catalog, store, _) = catalog();
        let shadow = ProductDraft::new("Shadow", Decimal::ONE).into_product(2);
        let extra = ProductDraft::new("Extra", Decimal::ONE).into_product(10);
        let extra_dup = ProductDraft::new("Extra again", Decimal::ONE).into_product(10);
        storage::write_json(store.as_ref(), keys::ADMIN_PRODUCTS, &vec![shadow, extra, extra_dup]).unwrap();
        store.set(keys::PRODUCT_EDITS, "not json").unwrap();

        let effective = catalog.effective_catalog();
        assert_eq!(ids(&effective), vec![1, 2, 3, 4, 5, 10]);
        assert_eq!(effective[1].name, "Shadow");
        assert_eq!(effective[5].name, "Extra");
    }

    #[test]
    fn test_mutations_publish_catalog_changed() {
        let (catalog, _, notifier) = catalog();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = notifier.subscribe(Topic::CatalogChanged, move |_| { counter.fetch_add(1, Ordering::SeqCst); });
        let id = catalog.add_product(ProductDraft::new("Y", Decimal::ONE)).unwrap();
        catalog.apply_edit(1, ProductPatch::hide_on_home(true)).unwrap();
        catalog.remove_product(id).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
