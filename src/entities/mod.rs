pub mod cart_item;
pub mod category;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_image;
pub mod product_rating;
pub mod promotion;
pub mod store;
pub mod user;
pub mod wishlist_item;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    Schema, Set, TransactionTrait,
};

use crate::entities::{
    cart_item::Entity as CartItem, category::Entity as Category, order::Entity as Order,
    order_item::Entity as OrderItem, product::Entity as Product,
    product_image::Entity as ProductImage, product_rating::Entity as ProductRating,
    promotion::Entity as Promotion, store::Entity as Store, user::Entity as User,
    wishlist_item::Entity as WishlistItem,
};

/// Create every table from its entity definition. Dev/test bootstrap only;
/// a managed deployment owns its schema.
pub async fn setup_schema(db: &impl ConnectionTrait) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    let statements = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Store),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(ProductImage),
        schema.create_table_from_entity(CartItem),
        schema.create_table_from_entity(ProductRating),
        schema.create_table_from_entity(Promotion),
        schema.create_table_from_entity(WishlistItem),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
    ];

    for statement in statements {
        db.execute(db.get_database_backend().build(&statement))
            .await?;
    }

    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| "Failed to hash password".to_owned())
}

/// Seed a demo shopper, a seller with a store, two categories, a couple of
/// products and an active promotion so a fresh database is browsable.
/// No-op when users already exist.
pub async fn primary_setup(db: &DatabaseConnection) {
    let existing = User::find()
        .count(db)
        .await
        .expect("Failed to inspect users table");
    if existing > 0 {
        return;
    }

    let password_hash = hash_password("Secret15").expect("Failed to hash seed password");
    let now = Utc::now();

    let txn = db.begin().await.expect("Failed to open seed transaction");

    let shopper = user::ActiveModel {
        username: Set("user".to_owned()),
        password: Set(password_hash.clone()),
        display_name: Set("Demo Shopper".to_owned()),
        role: Set(user::Role::User),
        created_at: Set(now),
        ..Default::default()
    };
    let seller = user::ActiveModel {
        username: Set("seller".to_owned()),
        password: Set(password_hash),
        display_name: Set("Stellar Goods".to_owned()),
        role: Set(user::Role::Seller),
        created_at: Set(now),
        ..Default::default()
    };

    let _shopper = shopper.insert(&txn).await.expect("Failed to seed users");
    let seller = seller.insert(&txn).await.expect("Failed to seed users");

    let store = store::ActiveModel {
        owner_id: Set(seller.id),
        name: Set("Stellar Goods".to_owned()),
        description: Set("Everything for the night sky enthusiast".to_owned()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .expect("Failed to seed store");

    let telescopes = category::ActiveModel {
        name: Set("Telescopes".to_owned()),
        slug: Set("telescopes".to_owned()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .expect("Failed to seed categories");
    let accessories = category::ActiveModel {
        name: Set("Accessories".to_owned()),
        slug: Set("accessories".to_owned()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .expect("Failed to seed categories");

    let refractor = product::ActiveModel {
        store_id: Set(store.id),
        category_id: Set(telescopes.id),
        title: Set("70mm Refractor Telescope".to_owned()),
        description: Set("Entry level refractor with a steel tripod".to_owned()),
        price: Set(129.99),
        stock: Set(25),
        rating: Set(0.0),
        rating_count: Set(0),
        featured: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .expect("Failed to seed products");

    product::ActiveModel {
        store_id: Set(store.id),
        category_id: Set(accessories.id),
        title: Set("Moon Filter".to_owned()),
        description: Set("Neutral density filter for 1.25\" eyepieces".to_owned()),
        price: Set(14.50),
        stock: Set(120),
        rating: Set(0.0),
        rating_count: Set(0),
        featured: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .expect("Failed to seed products");

    product_image::ActiveModel {
        product_id: Set(refractor.id),
        url: Set("https://images.stellarmarket.dev/refractor-70.jpg".to_owned()),
        alt_text: Set("70mm refractor on tripod".to_owned()),
        display_order: Set(0),
        is_primary: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .expect("Failed to seed product images");

    promotion::ActiveModel {
        code: Set("WELCOME10".to_owned()),
        discount_percentage: Set(10.0),
        active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .expect("Failed to seed promotions");

    txn.commit().await.expect("Failed to commit seed data");
}
