//! Promotional display order.
//!
//! The stored order is a priority list of product ids. It does not have to be
//! complete or current: ids that no longer resolve to a visible product are skipped
//! at read time and every visible product not mentioned follows in catalog order.

use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::CatalogStore;
use crate::domain::aggregates::Product;
use crate::domain::events::{Notifier, Topic};
use crate::domain::value_objects::ProductId;
use crate::storage::{self, keys, KeyValueStore};
use crate::Result;

/// Visible products, stored ids first, then the rest in catalog order.
/// Later duplicates in `stored` are ignored.
pub fn compute_order(catalog: &[Product], stored: &[ProductId]) -> Vec<Product> {
    let visible: Vec<&Product> = catalog.iter().filter(|p| p.is_visible_on_home()).collect();
    let mut placed: HashSet<ProductId> = HashSet::with_capacity(visible.len());
    let mut ordered = Vec::with_capacity(visible.len());

    for id in stored {
        if placed.contains(id) { continue; }
        if let Some(product) = visible.iter().find(|p| p.id == *id) {
            placed.insert(*id);
            ordered.push((*product).clone());
        }
    }
    ordered.extend(visible.into_iter().filter(|p| !placed.contains(&p.id)).cloned());
    ordered
}

/// New stored order after dragging `displayed[dragged]` onto position `drop_at`.
///
/// Ids that were in `previous` but are not displayed right now (hidden or removed)
/// keep their relative priority behind the displayed ones. Returns `None` when
/// nothing moves.
pub fn reorder(displayed: &[ProductId], previous: &[ProductId], dragged: Option<usize>, drop_at: usize) -> Option<Vec<ProductId>> {
    let dragged = dragged?;
    if dragged == drop_at || dragged >= displayed.len() {
        return None;
    }

    let mut ids = displayed.to_vec();
    let moved = ids.remove(dragged);
    let at = drop_at.min(displayed.len() - 1);
    ids.insert(at, moved);

    let mut seen: HashSet<ProductId> = ids.iter().copied().collect();
    for id in previous {
        if seen.insert(*id) {
            ids.push(*id);
        }
    }
    Some(ids)
}

#[derive(Clone)]
pub struct PromotionStore {
    store: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    catalog: CatalogStore,
}

impl PromotionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Notifier, catalog: CatalogStore) -> Self {
        Self { store, notifier, catalog }
    }

    pub fn stored_order(&self) -> Vec<ProductId> {
        storage::read_value(self.store.as_ref(), keys::PROMO_ORDER)
    }

    /// Products as the promotional grid shows them.
    pub fn displayed(&self) -> Vec<Product> {
        compute_order(&self.catalog.effective_catalog(), &self.stored_order())
    }

    /// Applies a drag-and-drop on the displayed sequence. Returns whether the
    /// stored order changed.
    pub fn reorder(&self, dragged: Option<usize>, drop_at: usize) -> Result<bool> {
        let displayed: Vec<ProductId> = self.displayed().iter().map(|p| p.id).collect();
        let Some(next) = reorder(&displayed, &self.stored_order(), dragged, drop_at) else {
            return Ok(false);
        };
        storage::write_json(self.store.as_ref(), keys::PROMO_ORDER, &next)?;
        tracing::debug!(?dragged, drop_at, "promotion order updated");
        self.notifier.publish(Topic::PromotionOrderChanged);
        Ok(true)
    }

    pub fn reset(&self) -> Result<()> {
        self.store.remove(keys::PROMO_ORDER)?;
        tracing::info!("promotion order reset");
        self.notifier.publish(Topic::PromotionOrderChanged);
        Ok(())
    }
}

impl std::fmt::Debug for PromotionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromotionStore").finish_non_exhaustive()
    }
}
