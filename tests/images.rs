mod common;

use stellar_market::entities::user::Role;
use stellar_market::middleware::logging::ApiError;
use stellar_market::services::images::{self, ImageUpdate, ReorderEntry};

use common::{seed_category, seed_image, seed_product, seed_store, seed_user, setup};

#[tokio::test]
async fn listing_follows_display_order_and_primary_lookup_works() {
    let db = setup().await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 100.0, 5).await;
    seed_image(&db, product.id, "https://img.test/second.jpg", 1, false).await;
    seed_image(&db, product.id, "https://img.test/first.jpg", 0, true).await;

    let listed = images::product_images(&db, product.id).await.expect("list failed");
    let urls: Vec<_> = listed.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["https://img.test/first.jpg", "https://img.test/second.jpg"]);

    let primary = images::primary_image(&db, product.id)
        .await
        .expect("primary lookup failed")
        .expect("primary missing");
    assert_eq!(primary.url, "https://img.test/first.jpg");
}

#[tokio::test]
async fn promoting_a_new_primary_demotes_the_old_one() {
    let db = setup().await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 100.0, 5).await;
    let old_primary = seed_image(&db, product.id, "https://img.test/a.jpg", 0, true).await;
    let challenger = seed_image(&db, product.id, "https://img.test/b.jpg", 1, false).await;

    let updated = images::update_image(
        &db,
        store.id,
        challenger.id,
        ImageUpdate {
            alt_text: Some("new cover".to_owned()),
            display_order: None,
            is_primary: Some(true),
        },
    )
    .await
    .expect("update failed");
    assert!(updated.is_primary);
    assert_eq!(updated.alt_text, "new cover");

    let primary = images::primary_image(&db, product.id)
        .await
        .expect("primary lookup failed")
        .expect("primary missing");
    assert_eq!(primary.id, challenger.id);
    assert_ne!(primary.id, old_primary.id);
}

#[tokio::test]
async fn updates_are_scoped_to_the_owning_store() {
    let db = setup().await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let rival = seed_user(&db, "rival", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let rival_store = seed_store(&db, rival.id, "rival store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 100.0, 5).await;
    let image = seed_image(&db, product.id, "https://img.test/a.jpg", 0, true).await;

    let err = images::update_image(
        &db,
        rival_store.id,
        image.id,
        ImageUpdate {
            alt_text: Some("hijacked".to_owned()),
            display_order: None,
            is_primary: None,
        },
    )
    .await
    .expect_err("foreign store must not touch the image");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn bulk_reorder_applies_good_entries_and_collects_bad_ones() {
    let db = setup().await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let rival = seed_user(&db, "rival", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let rival_store = seed_store(&db, rival.id, "rival store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 100.0, 5).await;
    let foreign_product =
        seed_product(&db, rival_store.id, category.id, "Foreign", 10.0, 5).await;

    let first = seed_image(&db, product.id, "https://img.test/a.jpg", 0, true).await;
    let second = seed_image(&db, product.id, "https://img.test/b.jpg", 1, false).await;
    let foreign = seed_image(&db, foreign_product.id, "https://img.test/x.jpg", 0, true).await;

    let outcome = images::reorder_images(
        &db,
        store.id,
        vec![
            ReorderEntry {
                image_id: first.id,
                display_order: 5,
            },
            ReorderEntry {
                image_id: second.id,
                display_order: 2,
            },
            ReorderEntry {
                image_id: foreign.id,
                display_order: 0,
            },
            ReorderEntry {
                image_id: 4242,
                display_order: 9,
            },
        ],
    )
    .await
    .expect("reorder failed");

    //Every bad entry is reported, the good ones still landed.
    assert_eq!(outcome.updated, 2);
    assert_eq!(outcome.failed.len(), 2);
    let failed_ids: Vec<_> = outcome.failed.iter().map(|f| f.image_id).collect();
    assert!(failed_ids.contains(&foreign.id));
    assert!(failed_ids.contains(&4242));

    let listed = images::product_images(&db, product.id).await.expect("list failed");
    let urls: Vec<_> = listed.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["https://img.test/b.jpg", "https://img.test/a.jpg"]);
}
