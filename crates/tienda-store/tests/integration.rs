//! File-backed catalog store exercised end to end against the shipped demo
//! catalog.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tienda_core::{load_catalog_seed, CatalogSeed, Coordinate};
use tienda_store::{CatalogEvent, CatalogStore, NewSeller, ProductDraft, StoreError};

fn demo_seed() -> CatalogSeed {
    let path: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/catalog.yaml");
    load_catalog_seed(&path).expect("shipped catalog loads")
}

fn draft(name: &str, price: i64) -> ProductDraft {
    ProductDraft {
        id: None,
        sku: None,
        name: name.to_string(),
        description: String::new(),
        brand: String::new(),
        tool_type: String::new(),
        size: String::new(),
        quantity: 4,
        price: Decimal::from(price),
        image_url: None,
    }
}

fn new_seller(email: &str) -> NewSeller {
    NewSeller {
        name: "Ferretería Nueva".to_string(),
        email: email.to_string(),
        business_type: "Ferretería".to_string(),
        address: "Av. del Mar 100, La Serena".to_string(),
        phone: String::new(),
        coordinate: Some(Coordinate {
            lat: -29.92,
            lng: -71.27,
        }),
    }
}

#[test]
fn seeding_is_idempotent_per_version() {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::open(dir.path()).unwrap();
    let seed = demo_seed();

    let first = store.seed_if_outdated(&seed).unwrap();
    assert!(first.products_written);
    assert_eq!(first.sellers_added, 4);
    assert_eq!(store.get_products().unwrap().len(), seed.products.len());
    assert_eq!(store.catalog_version().unwrap().as_deref(), Some(seed.version.as_str()));

    let second = store.seed_if_outdated(&seed).unwrap();
    assert!(!second.products_written);
    assert_eq!(second.sellers_added, 0);

    let forced = store.force_seed(&seed).unwrap();
    assert!(forced.products_written);
}

#[test]
fn new_version_reseeds_but_keeps_other_sellers_listings() {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::open(dir.path()).unwrap();
    let mut seed = demo_seed();
    store.seed_if_outdated(&seed).unwrap();

    let seller = store.register_seller(new_seller("nueva@ferreteria.cl")).unwrap();
    let own = store.upsert_product(&seller.id, draft("Huincha 3m", 2990)).unwrap();

    seed.version = "v4".to_string();
    seed.products.truncate(5);
    let outcome = store.seed_if_outdated(&seed).unwrap();
    assert!(outcome.products_written);

    let products = store.get_products().unwrap();
    assert_eq!(products.len(), 6);
    assert!(products.iter().any(|p| p.id == own.id));
}

#[test]
fn reseed_moves_listing_whose_id_the_catalog_claims() {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::open(dir.path()).unwrap();
    let mut seed = demo_seed();
    store.seed_if_outdated(&seed).unwrap();

    let seller = store.register_seller(new_seller("nueva@ferreteria.cl")).unwrap();
    let own = store.upsert_product(&seller.id, draft("Huincha 3m", 2990)).unwrap();

    let mut demo = seed.products[0].clone();
    demo.id = own.id;
    demo.sku = Some("NIVEL-001".to_string());
    demo.name = "Nivel de burbuja".to_string();
    seed.products.push(demo);
    seed.version = "v4".to_string();
    assert!(store.seed_if_outdated(&seed).unwrap().products_written);

    let products = store.get_products().unwrap();
    assert_eq!(products.len(), seed.products.len() + 1);
    let claimed = products.iter().find(|p| p.id == own.id).unwrap();
    assert_eq!(claimed.name, "Nivel de burbuja");

    let mine = store.seller_products(&seller.id).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Huincha 3m");
    assert_ne!(mine[0].id, own.id);
    assert_eq!(products.iter().filter(|p| p.id == mine[0].id).count(), 1);
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = CatalogStore::open(dir.path()).unwrap();
        store.seed_if_outdated(&demo_seed()).unwrap();
        store.add_to_cart(101).unwrap();
    }
    let reopened = CatalogStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get_sellers().unwrap().len(), 4);
    assert_eq!(reopened.cart_summary().unwrap().item_count, 1);
}

#[test]
fn register_seller_rejects_duplicate_email() {
    let store = CatalogStore::in_memory();
    store.seed_if_outdated(&demo_seed()).unwrap();

    let err = store
        .register_seller(new_seller("DonPepe@Ferreteria.cl"))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(_)));

    let err = store.register_seller(new_seller("no-at-sign")).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn register_seller_assigns_unique_ids() {
    let store = CatalogStore::in_memory();
    let a = store.register_seller(new_seller("a@example.cl")).unwrap();
    let b = store.register_seller(new_seller("b@example.cl")).unwrap();
    assert_ne!(a.id, b.id);
    assert!(a.id.starts_with("seller-"));
    assert_eq!(store.seller(&a.id).unwrap().email, "a@example.cl");
}

#[test]
fn replace_inventory_only_touches_one_seller() {
    let store = CatalogStore::in_memory();
    let seed = demo_seed();
    store.seed_if_outdated(&seed).unwrap();

    let before_other = store.seller_products("ferre-2").unwrap();
    let mut kept = ProductDraft::from(&store.seller_products("ferre-1").unwrap()[0]);
    kept.price = Decimal::from(8990);

    let replaced = store
        .replace_seller_inventory("ferre-1", vec![kept, draft("Sierra de arco", 7990)])
        .unwrap();
    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[0].id, 101);
    assert_eq!(replaced[0].price, Decimal::from(8990));
    assert!(replaced.iter().all(|p| p.seller_id == "ferre-1"));

    assert_eq!(store.seller_products("ferre-1").unwrap().len(), 2);
    assert_eq!(store.seller_products("ferre-2").unwrap(), before_other);
}

#[test]
fn replace_inventory_reassigns_ids_owned_by_others() {
    let store = CatalogStore::in_memory();
    store.seed_if_outdated(&demo_seed()).unwrap();

    let mut stolen = draft("Pala", 1000);
    stolen.id = Some(201); // owned by ferre-2
    let replaced = store.replace_seller_inventory("ferre-1", vec![stolen]).unwrap();
    assert_ne!(replaced[0].id, 201);
    assert_eq!(
        store
            .get_products()
            .unwrap()
            .iter()
            .filter(|p| p.id == 201)
            .count(),
        1
    );
}

#[test]
fn replace_inventory_validates_listings() {
    let store = CatalogStore::in_memory();
    store.seed_if_outdated(&demo_seed()).unwrap();
    let before = store.get_products().unwrap();

    let err = store
        .replace_seller_inventory("ferre-1", vec![draft("Pala", -1)])
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get_products().unwrap(), before);

    let err = store
        .replace_seller_inventory("ferre-99", Vec::new())
        .unwrap_err();
    assert!(matches!(err, StoreError::SellerNotFound(_)));
}

#[test]
fn replace_inventory_rejects_id_at_top_of_range() {
    let store = CatalogStore::in_memory();
    store.seed_if_outdated(&demo_seed()).unwrap();
    let before = store.get_products().unwrap();

    let mut last = draft("Pala", 1000);
    last.id = Some(u64::MAX);
    let err = store.replace_seller_inventory("ferre-1", vec![last]).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
    assert_eq!(store.get_products().unwrap(), before);
}

#[test]
fn upsert_and_delete_product() {
    let store = CatalogStore::in_memory();
    store.seed_if_outdated(&demo_seed()).unwrap();
    let next = store.next_product_id().unwrap();

    let created = store.upsert_product("ferre-3", draft("Llana dentada", 3490)).unwrap();
    assert_eq!(created.id, next);
    assert!(created.created_at.is_some());

    let mut edit = ProductDraft::from(&created);
    edit.quantity = 99;
    let updated = store.upsert_product("ferre-3", edit.clone()).unwrap();
    assert_eq!(updated.quantity, 99);
    assert_eq!(updated.created_at, created.created_at);

    // Another seller cannot edit it.
    assert!(matches!(
        store.upsert_product("ferre-1", edit),
        Err(StoreError::ProductNotFound(_))
    ));

    store.delete_product(created.id).unwrap();
    assert!(matches!(
        store.delete_product(created.id),
        Err(StoreError::ProductNotFound(_))
    ));
}

#[test]
fn cart_snapshots_and_totals() {
    let store = CatalogStore::in_memory();
    store.seed_if_outdated(&demo_seed()).unwrap();

    let hammer = store.add_to_cart(101).unwrap();
    assert_eq!(hammer.seller_name.as_deref(), Some("Ferretería Don Pepe"));
    store.add_to_cart(201).unwrap();
    store.add_to_cart(101).unwrap();

    let summary = store.cart_summary().unwrap();
    assert_eq!(summary.item_count, 3);
    assert_eq!(summary.total, Decimal::from(9990 + 74_990 + 9990));

    let removed = store.remove_from_cart(1).unwrap();
    assert_eq!(removed.product_id, 201);
    assert!(matches!(
        store.remove_from_cart(5),
        Err(StoreError::CartIndexOutOfRange { index: 5, len: 2 })
    ));

    // Snapshot keeps the price it was added at.
    let mut edit = ProductDraft::from(&store.seller_products("ferre-1").unwrap()[0]);
    edit.price = Decimal::from(1);
    store.upsert_product("ferre-1", edit).unwrap();
    assert_eq!(store.cart_summary().unwrap().total, Decimal::from(9990 * 2));

    store.clear_cart().unwrap();
    assert_eq!(store.cart_summary().unwrap().item_count, 0);
    assert!(matches!(
        store.add_to_cart(424_242),
        Err(StoreError::ProductNotFound(424_242))
    ));
}

#[test]
fn writes_notify_subscribers() {
    let store = CatalogStore::in_memory();
    let mut sub = store.subscribe();
    store.seed_if_outdated(&demo_seed()).unwrap();
    store.add_to_cart(101).unwrap();
    store
        .record_precise_location(Coordinate {
            lat: -29.9,
            lng: -71.25,
        })
        .unwrap();

    let mut seen = Vec::new();
    while let Some(event) = sub.try_recv() {
        seen.push(event);
    }
    assert_eq!(
        seen,
        [
            CatalogEvent::SellersChanged,
            CatalogEvent::ProductsChanged,
            CatalogEvent::CartChanged,
            CatalogEvent::LocationChanged,
        ]
    );
}
