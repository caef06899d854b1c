mod common;

use sea_orm::TransactionTrait;

use stellar_market::entities::user::Role;
use stellar_market::middleware::logging::ApiError;
use stellar_market::services::cart;

use common::{seed_category, seed_image, seed_product, seed_promotion, seed_store, seed_user, setup};

#[tokio::test]
async fn add_then_get_yields_single_line_with_line_total() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 129.99, 5).await;

    let view = cart::add_to_cart(&db, shopper.id, product.id, 3)
        .await
        .expect("add_to_cart failed");

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 3);
    assert!((view.items[0].line_total - 129.99 * 3.0).abs() < 1e-9);

    let fetched = cart::get_cart(&db, shopper.id).await.expect("get_cart failed");
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.item_count, 3);
    assert!((fetched.total - 129.99 * 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn adding_same_product_twice_merges_into_one_line() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 10.0, 10).await;

    cart::add_to_cart(&db, shopper.id, product.id, 2)
        .await
        .expect("first add failed");
    let view = cart::add_to_cart(&db, shopper.id, product.id, 3)
        .await
        .expect("second add failed");

    assert_eq!(view.items.len(), 1, "merge must never produce two lines");
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.item_count, 5);
}

#[tokio::test]
async fn requesting_more_than_stock_fails_and_leaves_cart_unmodified() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 10.0, 5).await;

    let err = cart::add_to_cart(&db, shopper.id, product.id, 6)
        .await
        .expect_err("over-stock add must fail");
    match err {
        ApiError::BadRequest(message) => {
            assert!(message.contains("Only 5 items available"), "{}", message)
        }
        other => panic!("expected BadRequest, got {:?}", other),
    }

    let view = cart::get_cart(&db, shopper.id).await.expect("get_cart failed");
    assert!(view.items.is_empty());
}

#[tokio::test]
async fn merge_exceeding_stock_reports_total_available_and_keeps_quantity() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 10.0, 5).await;

    cart::add_to_cart(&db, shopper.id, product.id, 3)
        .await
        .expect("first add failed");

    //The merged total (6) is what gets checked, not the delta (3). The
    //service call runs inside a transaction exactly like the handler, so
    //the failed merge rolls back as one unit.
    let txn = db.begin().await.expect("begin failed");
    let err = cart::add_to_cart(&txn, shopper.id, product.id, 3)
        .await
        .expect_err("merge past stock must fail");
    txn.rollback().await.expect("rollback failed");

    match err {
        ApiError::BadRequest(message) => assert!(
            message.contains("Only 5 items available in total"),
            "{}",
            message
        ),
        other => panic!("expected BadRequest, got {:?}", other),
    }

    let view = cart::get_cart(&db, shopper.id).await.expect("get_cart failed");
    assert_eq!(view.items[0].quantity, 3, "failed merge must not change the line");
}

#[tokio::test]
async fn zero_quantity_is_a_validation_error() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 10.0, 5).await;

    let err = cart::add_to_cart(&db, shopper.id, product.id, 0)
        .await
        .expect_err("zero quantity must fail");
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn adding_unknown_product_fails_not_found() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;

    let err = cart::add_to_cart(&db, shopper.id, 4242, 1)
        .await
        .expect_err("unknown product must fail");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn update_sets_absolute_quantity_and_checks_stock() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 10.0, 5).await;

    let view = cart::add_to_cart(&db, shopper.id, product.id, 2)
        .await
        .expect("add failed");
    let line_id = view.items[0].id;

    let view = cart::update_cart_item(&db, shopper.id, line_id, 5)
        .await
        .expect("update failed");
    assert_eq!(view.items[0].quantity, 5);

    let err = cart::update_cart_item(&db, shopper.id, line_id, 6)
        .await
        .expect_err("update past stock must fail");
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn cart_items_are_scoped_to_their_owner() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let other = seed_user(&db, "other", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 10.0, 5).await;

    let view = cart::add_to_cart(&db, shopper.id, product.id, 2)
        .await
        .expect("add failed");
    let line_id = view.items[0].id;

    let err = cart::update_cart_item(&db, other.id, line_id, 1)
        .await
        .expect_err("foreign update must fail");
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = cart::remove_from_cart(&db, other.id, line_id)
        .await
        .expect_err("foreign remove must fail");
    assert!(matches!(err, ApiError::NotFound(_)));

    let view = cart::get_cart(&db, shopper.id).await.expect("get_cart failed");
    assert_eq!(view.items.len(), 1);
}

#[tokio::test]
async fn remove_and_clear_empty_the_cart() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let first = seed_product(&db, store.id, category.id, "Refractor", 10.0, 5).await;
    let second = seed_product(&db, store.id, category.id, "Filter", 4.0, 50).await;

    let view = cart::add_to_cart(&db, shopper.id, first.id, 1)
        .await
        .expect("add failed");
    cart::add_to_cart(&db, shopper.id, second.id, 2)
        .await
        .expect("add failed");

    let after_remove = cart::remove_from_cart(&db, shopper.id, view.items[0].id)
        .await
        .expect("remove failed");
    assert_eq!(after_remove.items.len(), 1);

    let cleared = cart::clear_cart(&db, shopper.id).await.expect("clear failed");
    assert!(cleared.items.is_empty());
    assert_eq!(cleared.total, 0.0);
    assert_eq!(cleared.item_count, 0);

    let fetched = cart::get_cart(&db, shopper.id).await.expect("get_cart failed");
    assert!(fetched.items.is_empty());
}

#[tokio::test]
async fn clearing_an_already_empty_cart_is_fine() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;

    let cleared = cart::clear_cart(&db, shopper.id).await.expect("clear failed");
    assert!(cleared.items.is_empty());
    assert_eq!(cleared.total, 0.0);
    assert_eq!(cleared.item_count, 0);
}

#[tokio::test]
async fn projection_carries_primary_image_and_tolerates_deleted_products() {
    use sea_orm::{EntityTrait, ModelTrait};
    use stellar_market::entities::product;

    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let kept = seed_product(&db, store.id, category.id, "Refractor", 10.0, 5).await;
    let doomed = seed_product(&db, store.id, category.id, "Filter", 4.0, 50).await;
    seed_image(&db, kept.id, "https://img.test/refractor.jpg", 0, true).await;

    cart::add_to_cart(&db, shopper.id, kept.id, 2)
        .await
        .expect("add failed");
    cart::add_to_cart(&db, shopper.id, doomed.id, 3)
        .await
        .expect("add failed");

    //Simulate a concurrent product deletion underneath the cart row.
    let doomed = product::Entity::find_by_id(doomed.id)
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("product missing");
    doomed.delete(&db).await.expect("delete failed");

    let view = cart::get_cart(&db, shopper.id).await.expect("get_cart failed");
    assert_eq!(view.items.len(), 2, "orphaned line is still returned");

    let kept_line = view
        .items
        .iter()
        .find(|line| line.product_id == kept.id)
        .expect("kept line missing");
    assert_eq!(
        kept_line.product.as_ref().and_then(|p| p.image_url.as_deref()),
        Some("https://img.test/refractor.jpg")
    );

    let orphan = view
        .items
        .iter()
        .find(|line| line.product_id != kept.id)
        .expect("orphan line missing");
    assert!(orphan.product.is_none());
    assert_eq!(orphan.line_total, 0.0);

    //Only the surviving line counts.
    assert!((view.total - 20.0).abs() < 1e-9);
    assert_eq!(view.item_count, 2);
}

#[tokio::test]
async fn promo_code_discounts_without_persisting() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;
    let product = seed_product(&db, store.id, category.id, "Refractor", 100.0, 10).await;
    seed_promotion(&db, "WELCOME10", 10.0, true).await;

    cart::add_to_cart(&db, shopper.id, product.id, 2)
        .await
        .expect("add failed");

    //Lower-cased input matches the stored upper-case code.
    let discounted = cart::apply_promo_code(&db, shopper.id, "welcome10")
        .await
        .expect("promo failed");
    assert!((discounted.discount - 20.0).abs() < 1e-9);
    assert!((discounted.cart.total - 180.0).abs() < 1e-9);

    //Request-scoped: a plain re-fetch knows nothing about the discount.
    let plain = cart::get_cart(&db, shopper.id).await.expect("get_cart failed");
    assert!((plain.total - 200.0).abs() < 1e-9);
}

#[tokio::test]
async fn inactive_or_unknown_promo_codes_fail_not_found() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    seed_promotion(&db, "EXPIRED5", 5.0, false).await;

    let err = cart::apply_promo_code(&db, shopper.id, "EXPIRED5")
        .await
        .expect_err("inactive promo must fail");
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = cart::apply_promo_code(&db, shopper.id, "NOSUCHCODE")
        .await
        .expect_err("unknown promo must fail");
    assert!(matches!(err, ApiError::NotFound(_)));
}
