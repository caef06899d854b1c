#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use stellar_market::entities::{
    category, order, order_item, product, product_image, promotion, setup_schema, store, user,
};

/// Fresh in-memory database with the full schema. Capped at a single
/// connection so every query and transaction sees the same SQLite
/// instance.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");
    db
}

pub async fn seed_user(db: &DatabaseConnection, username: &str, role: user::Role) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set("not-a-real-hash".to_owned()),
        display_name: Set(format!("{} display", username)),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

pub async fn seed_store(db: &DatabaseConnection, owner_id: i32, name: &str) -> store::Model {
    store::ActiveModel {
        owner_id: Set(owner_id),
        name: Set(name.to_owned()),
        description: Set("test store".to_owned()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed store")
}

pub async fn seed_category(db: &DatabaseConnection, name: &str, slug: &str) -> category::Model {
    category::ActiveModel {
        name: Set(name.to_owned()),
        slug: Set(slug.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed category")
}

pub async fn seed_product(
    db: &DatabaseConnection,
    store_id: i32,
    category_id: i32,
    title: &str,
    price: f64,
    stock: u32,
) -> product::Model {
    seed_product_with(db, store_id, category_id, title, price, stock, false).await
}

pub async fn seed_product_with(
    db: &DatabaseConnection,
    store_id: i32,
    category_id: i32,
    title: &str,
    price: f64,
    stock: u32,
    featured: bool,
) -> product::Model {
    let now = Utc::now();
    product::ActiveModel {
        store_id: Set(store_id),
        category_id: Set(category_id),
        title: Set(title.to_owned()),
        description: Set(format!("{} description", title)),
        price: Set(price),
        stock: Set(stock),
        rating: Set(0.0),
        rating_count: Set(0),
        featured: Set(featured),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
}

pub async fn seed_image(
    db: &DatabaseConnection,
    product_id: i32,
    url: &str,
    display_order: i32,
    is_primary: bool,
) -> product_image::Model {
    product_image::ActiveModel {
        product_id: Set(product_id),
        url: Set(url.to_owned()),
        alt_text: Set("test image".to_owned()),
        display_order: Set(display_order),
        is_primary: Set(is_primary),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed image")
}

pub async fn seed_promotion(
    db: &DatabaseConnection,
    code: &str,
    discount_percentage: f64,
    active: bool,
) -> promotion::Model {
    promotion::ActiveModel {
        code: Set(code.to_owned()),
        discount_percentage: Set(discount_percentage),
        active: Set(active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed promotion")
}

pub async fn seed_order(
    db: &DatabaseConnection,
    store_id: i32,
    user_id: i32,
    status: order::Status,
    total_amount: f64,
    created_at: DateTime<Utc>,
) -> order::Model {
    order::ActiveModel {
        reference: Set(uuid::Uuid::new_v4().to_string()),
        user_id: Set(user_id),
        store_id: Set(store_id),
        status: Set(status),
        total_amount: Set(total_amount),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed order")
}

pub async fn seed_order_item(
    db: &DatabaseConnection,
    order_id: i32,
    product_id: i32,
    quantity: u32,
    unit_price: f64,
) -> order_item::Model {
    order_item::ActiveModel {
        order_id: Set(order_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed order item")
}
