mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use stellar_market::entities::order::Status;
use stellar_market::entities::product;
use stellar_market::entities::user::Role;
use stellar_market::middleware::logging::ApiError;
use stellar_market::services::stores;

use common::{seed_category, seed_order, seed_product, seed_store, seed_user, setup};

#[tokio::test]
async fn owner_without_a_store_gets_not_found() {
    let db = setup().await;
    let seller = seed_user(&db, "seller", Role::Seller).await;

    let err = stores::store_for_owner(&db, seller.id)
        .await
        .expect_err("no store yet");
    assert!(matches!(err, ApiError::NotFound(_)));

    let store = seed_store(&db, seller.id, "store").await;
    let found = stores::store_for_owner(&db, seller.id)
        .await
        .expect("lookup failed");
    assert_eq!(found.id, store.id);
}

#[tokio::test]
async fn overview_rolls_up_products_orders_and_ratings() {
    let db = setup().await;
    let shopper = seed_user(&db, "shopper", Role::User).await;
    let seller = seed_user(&db, "seller", Role::Seller).await;
    let store = seed_store(&db, seller.id, "store").await;
    let category = seed_category(&db, "Telescopes", "telescopes").await;

    let rated = seed_product(&db, store.id, category.id, "Rated", 100.0, 5).await;
    seed_product(&db, store.id, category.id, "Unrated", 50.0, 5).await;

    let row = product::Entity::find_by_id(rated.id)
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("product missing");
    let mut row: product::ActiveModel = row.into();
    row.rating = Set(4.0);
    row.rating_count = Set(2);
    row.update(&db).await.expect("update failed");

    let now = Utc::now();
    seed_order(&db, store.id, shopper.id, Status::Delivered, 120.0, now).await;
    seed_order(&db, store.id, shopper.id, Status::Cancelled, 999.0, now).await;

    let overview = stores::store_overview(&db, store.id)
        .await
        .expect("overview failed");

    assert_eq!(overview.product_count, 2);
    assert_eq!(overview.order_count, 2);
    assert!((overview.lifetime_revenue - 120.0).abs() < 1e-9);
    //Only the rated product feeds the average.
    assert!((overview.average_rating - 4.0).abs() < 1e-9);
}
