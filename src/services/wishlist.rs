use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::Serialize;

use crate::entities::{product, wishlist_item};
use crate::middleware::logging::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    pub id: i32,
    pub product_id: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub product: Option<product::Model>,
}

pub async fn wishlist<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Vec<WishlistEntry>, ApiError> {
    let rows = wishlist_item::Entity::find()
        .filter(wishlist_item::Column::UserId.eq(user_id))
        .find_also_related(product::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(item, product)| WishlistEntry {
            id: item.id,
            product_id: item.product_id,
            created_at: item.created_at,
            product,
        })
        .collect())
}

pub async fn add_to_wishlist<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    product_id: i32,
) -> Result<wishlist_item::Model, ApiError> {
    product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    if is_in_wishlist(conn, user_id, product_id).await? {
        return Err(ApiError::Conflict(
            "Product is already in the wishlist".to_owned(),
        ));
    }

    let entry = wishlist_item::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(entry)
}

pub async fn remove_from_wishlist<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    product_id: i32,
) -> Result<(), ApiError> {
    let entry = wishlist_item::Entity::find()
        .filter(wishlist_item::Column::UserId.eq(user_id))
        .filter(wishlist_item::Column::ProductId.eq(product_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wishlist item not found".to_owned()))?;

    entry.delete(conn).await?;
    Ok(())
}

pub async fn is_in_wishlist<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    product_id: i32,
) -> Result<bool, ApiError> {
    let existing = wishlist_item::Entity::find()
        .filter(wishlist_item::Column::UserId.eq(user_id))
        .filter(wishlist_item::Column::ProductId.eq(product_id))
        .one(conn)
        .await?;

    Ok(existing.is_some())
}
