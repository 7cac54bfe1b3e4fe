//! End-to-end flows across the admin panel and storefront views.

use chrono::{Duration, TimeZone, Utc};
use opensase_storefront::catalog::seed::base_catalog;
use opensase_storefront::domain::aggregates::{CustomerInfo, PaymentOption};
use opensase_storefront::{
    KeyValueStore, ManualClock, MemoryStore, Notifier, Product, ProductDraft, ProductPatch, RedbStore, Storefront,
    StorefrontConfig, StorefrontError, Topic,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn seed5() -> Vec<Product> {
    base_catalog().into_iter().take(5).collect()
}

fn ids(products: &[Product]) -> Vec<u64> {
    products.iter().map(|p| p.id).collect()
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Chioma Eze".into(),
        email: "chioma@example.com".into(),
        phone: "+2348091112222".into(),
        address: "7 Awolowo Road, Ikoyi".into(),
    }
}

#[test]
fn add_and_remove_admin_product() -> anyhow::Result<()> {
    let shop = Storefront::builder(Arc::new(MemoryStore::new()), &StorefrontConfig::default())
        .seed(seed5())
        .build();

    let id = shop.catalog.add_product(ProductDraft::new("X", Decimal::new(15, 0)))?;
    assert!(id > 5);
    assert_eq!(shop.catalog.effective_catalog().len(), 6);

    shop.catalog.remove_product(id)?;
    assert_eq!(ids(&shop.catalog.effective_catalog()), vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[test]
fn promotion_order_with_hidden_product() -> anyhow::Result<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let shop = Storefront::builder(store.clone(), &StorefrontConfig::default()).seed(seed5()).build();

    shop.catalog.apply_edit(5, ProductPatch::hide_on_home(true))?;
    store.set("promoOrderV1", "[3,1]")?;
    assert_eq!(ids(&shop.featured()), vec![3, 1, 2, 4]);

    // Drag the last card to the front, then read it back through a fresh view.
    assert!(shop.promotions.reorder(Some(3), 0)?);
    let other = Storefront::builder(store, &StorefrontConfig::default()).seed(seed5()).build();
    assert_eq!(ids(&other.featured()), vec![4, 3, 1, 2]);
    Ok(())
}

#[test]
fn two_views_share_redb_state() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = StorefrontConfig { db_path: dir.path().join("shop.redb"), ..StorefrontConfig::default() };
    let store: Arc<dyn KeyValueStore> = Arc::new(RedbStore::open(&config.db_path)?);
    let notifier = Notifier::new();

    let admin = Storefront::builder(store.clone(), &config).notifier(notifier.clone()).build();
    let storefront = Storefront::builder(store, &config).notifier(notifier.clone()).build();

    let refreshes = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&refreshes);
    let view = storefront.clone();
    let sub = notifier.subscribe(Topic::CatalogChanged, move |_| {
        // A subscriber re-reads storage; it gets no payload.
        if view.catalog.effective_catalog().iter().any(|p| p.name == "Linen Shirt") {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });

    let id = admin.catalog.add_product(ProductDraft::new("Linen Shirt", Decimal::new(45, 0)))?;
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(storefront.catalog.get(id).map(|p| p.name), Some("Linen Shirt".to_string()));

    sub.unsubscribe();
    admin.catalog.apply_edit(id, ProductPatch { price: Some(Decimal::new(40, 0)), ..ProductPatch::default() })?;
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(storefront.catalog.get(id).map(|p| p.price), Some(Decimal::new(40, 0)));
    Ok(())
}

#[test]
fn checkout_flow_reaches_admin_order_list() -> anyhow::Result<()> {
    let config = StorefrontConfig { shipping_fee: Decimal::new(5, 0), ..StorefrontConfig::default() };
    let shop = Storefront::in_memory(&config);

    let placed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&placed);
    let _sub = shop.notifier().subscribe(Topic::OrderPlaced, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    shop.add_to_cart(2)?;
    shop.add_to_cart(2)?;
    shop.add_to_cart(5)?;
    // A later price change does not touch what is already in the cart.
    shop.catalog.apply_edit(2, ProductPatch { price: Some(Decimal::new(1, 0)), ..ProductPatch::default() })?;
    assert_eq!(shop.cart().count(), 3);
    assert_eq!(shop.cart().total(), Decimal::new(9997, 2));

    let bad = CustomerInfo { email: String::new(), ..customer() };
    let err = shop.checkout(bad, PaymentOption::BankTransfer, None).unwrap_err();
    assert!(matches!(err, StorefrontError::Validation(_)));
    assert!(shop.orders.list().is_empty());
    assert_eq!(shop.cart().count(), 3);

    let order = shop.checkout(customer(), PaymentOption::BankTransfer, Some("data:image/png;base64,AAAA".into()))?;
    assert_eq!(order.totals.final_total, Decimal::new(10497, 2));
    assert!(shop.cart().is_empty());
    assert_eq!(placed.load(Ordering::SeqCst), 1);

    let orders = shop.orders.list();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, order.order_id);
    assert_eq!(orders[0].items.len(), 2);
    Ok(())
}

#[test]
fn admin_session_expires_after_eight_hours() -> anyhow::Result<()> {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()));
    let config = StorefrontConfig { admin_secret: "letmein".into(), ..StorefrontConfig::default() };
    let shop = Storefront::builder(Arc::new(MemoryStore::new()), &config).clock(clock.clone()).build();

    assert!(matches!(shop.session.login("admin123"), Err(StorefrontError::Auth)));
    shop.session.login("letmein")?;
    assert!(shop.session.is_authenticated());

    clock.advance(Duration::hours(8));
    assert!(!shop.session.is_authenticated());
    assert_eq!(shop.store().get("adminAuthenticated")?, None);
    Ok(())
}

#[test]
fn corrupted_storage_does_not_break_views() -> anyhow::Result<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set("adminProducts", "{broken")?;
    store.set("promoOrderV1", "\"3,1\"")?;
    store.set("ordersV1", "[1, 2, 3]")?;
    store.set("cartV1", "null")?;

    let shop = Storefront::builder(store, &StorefrontConfig::default()).seed(seed5()).build();
    assert_eq!(ids(&shop.catalog.effective_catalog()), vec![1, 2, 3, 4, 5]);
    assert_eq!(ids(&shop.featured()), vec![1, 2, 3, 4, 5]);
    assert!(shop.orders.list().is_empty());
    assert!(shop.cart().is_empty());
    assert!(shop.ask("tell me about the pearl drop earrings").contains("$29.99"));
    Ok(())
}
