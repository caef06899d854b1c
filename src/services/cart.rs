use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{cart_item, product, product_image, promotion};
use crate::middleware::logging::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct CartProduct {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub stock: u32,
    pub rating: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: i32,
    pub product_id: i32,
    pub quantity: u32,
    pub line_total: f64,
    pub product: Option<CartProduct>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: f64,
    pub item_count: u32,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            items: vec![],
            total: 0.0,
            item_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscountedCart {
    #[serde(flatten)]
    pub cart: CartView,
    pub discount: f64,
}

/// Stock guard: resolves the product and rejects a requested quantity the
/// current stock cannot cover. Every quantity-increasing mutation goes
/// through here with the quantity that would end up on the line, not the
/// delta.
pub async fn ensure_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    requested: u32,
) -> Result<product::Model, ApiError> {
    let product = product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    if requested > product.stock {
        return Err(ApiError::BadRequest(format!(
            "Not enough stock. Only {} items available.",
            product.stock
        )));
    }

    Ok(product)
}

/// Add a product to the user's cart, merging with an existing line for the
/// same product. The merged total is re-checked against stock before
/// anything is written.
pub async fn add_to_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    product_id: i32,
    quantity: u32,
) -> Result<CartView, ApiError> {
    if quantity == 0 {
        return Err(ApiError::Validation(
            "Quantity must be a positive number".to_owned(),
        ));
    }

    let product = ensure_stock(conn, product_id, quantity).await?;

    let existing = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(conn)
        .await?;

    match existing {
        Some(entry) => {
            let new_quantity = entry.quantity + quantity;
            if new_quantity > product.stock {
                return Err(ApiError::BadRequest(format!(
                    "Cannot add more items. Only {} items available in total.",
                    product.stock
                )));
            }

            let mut entry: cart_item::ActiveModel = entry.into();
            entry.quantity = Set(new_quantity);
            entry.updated_at = Set(Utc::now());
            entry.update(conn).await?;
        }
        None => {
            let now = Utc::now();
            cart_item::ActiveModel {
                user_id: Set(user_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
    }

    get_cart(conn, user_id).await
}

/// Set a cart line to an absolute quantity. The lookup is scoped to the
/// requesting user, so somebody else's line is indistinguishable from a
/// missing one.
pub async fn update_cart_item<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    cart_item_id: i32,
    quantity: u32,
) -> Result<CartView, ApiError> {
    if quantity == 0 {
        return Err(ApiError::Validation(
            "Quantity must be a positive number".to_owned(),
        ));
    }

    let entry = cart_item::Entity::find_by_id(cart_item_id)
        .filter(cart_item::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart item not found".to_owned()))?;

    ensure_stock(conn, entry.product_id, quantity).await?;

    let mut entry: cart_item::ActiveModel = entry.into();
    entry.quantity = Set(quantity);
    entry.updated_at = Set(Utc::now());
    entry.update(conn).await?;

    get_cart(conn, user_id).await
}

pub async fn remove_from_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    cart_item_id: i32,
) -> Result<CartView, ApiError> {
    let entry = cart_item::Entity::find_by_id(cart_item_id)
        .filter(cart_item::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart item not found".to_owned()))?;

    entry.delete(conn).await?;

    get_cart(conn, user_id).await
}

/// Deleting by user id cannot leave anything behind, so the empty cart is
/// returned without a re-fetch.
pub async fn clear_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<CartView, ApiError> {
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    Ok(CartView::empty())
}

/// Project the user's cart: lines joined with live product data and the
/// primary image, plus the running total and item count. A line whose
/// product has been deleted concurrently is kept in the response with no
/// product reference and contributes nothing to total or count.
pub async fn get_cart<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<CartView, ApiError> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .find_also_related(product::Entity)
        .all(conn)
        .await?;

    let product_ids: Vec<i32> = rows
        .iter()
        .filter_map(|(_, product)| product.as_ref().map(|p| p.id))
        .collect();

    let mut image_urls: HashMap<i32, String> = HashMap::new();
    if !product_ids.is_empty() {
        let primaries = product_image::Entity::find()
            .filter(product_image::Column::ProductId.is_in(product_ids))
            .filter(product_image::Column::IsPrimary.eq(true))
            .all(conn)
            .await?;
        for image in primaries {
            image_urls.entry(image.product_id).or_insert(image.url);
        }
    }

    let mut total = 0.0;
    let mut item_count: u32 = 0;

    let items = rows
        .into_iter()
        .map(|(item, product)| {
            let product = product.map(|p| CartProduct {
                image_url: image_urls.get(&p.id).cloned(),
                id: p.id,
                title: p.title,
                price: p.price,
                stock: p.stock,
                rating: p.rating,
            });

            let line_total = match &product {
                Some(p) => p.price * item.quantity as f64,
                None => 0.0,
            };
            if product.is_some() {
                total += line_total;
                item_count += item.quantity;
            }

            CartLine {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                line_total,
                product,
                created_at: item.created_at,
                updated_at: item.updated_at,
            }
        })
        .collect();

    Ok(CartView {
        items,
        total,
        item_count,
    })
}

/// Apply a promotion code to the current cart total. Request-scoped only:
/// nothing is persisted, and a later plain `get_cart` knows nothing about
/// the discount.
pub async fn apply_promo_code<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    code: &str,
) -> Result<DiscountedCart, ApiError> {
    let normalized = code.trim().to_uppercase();

    let promo = promotion::Entity::find()
        .filter(promotion::Column::Code.eq(&normalized))
        .filter(promotion::Column::Active.eq(true))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired promotion code".to_owned()))?;

    let mut cart = get_cart(conn, user_id).await?;

    let discount = cart.total * (promo.discount_percentage / 100.0);
    cart.total -= discount;

    Ok(DiscountedCart { cart, discount })
}
