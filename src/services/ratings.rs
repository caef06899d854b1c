use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;

use crate::entities::{product, product_rating, user};
use crate::middleware::logging::ApiError;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct RatingView {
    pub id: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub user_display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingPage {
    pub ratings: Vec<RatingView>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Insert or update the caller's rating for a product, then refresh the
/// product's aggregate. The caller is expected to run this inside a
/// transaction so the aggregate can never be observed out of step with
/// the rating rows.
pub async fn add_rating<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    product_id: i32,
    rating: i32,
    comment: Option<String>,
) -> Result<product_rating::Model, ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(
            "Rating must be an integer between 1 and 5".to_owned(),
        ));
    }

    product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    let existing = product_rating::Entity::find()
        .filter(product_rating::Column::ProductId.eq(product_id))
        .filter(product_rating::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    let saved = match existing {
        Some(row) => {
            let mut row: product_rating::ActiveModel = row.into();
            row.rating = Set(rating);
            row.comment = Set(comment);
            row.update(conn).await?
        }
        None => {
            product_rating::ActiveModel {
                product_id: Set(product_id),
                user_id: Set(user_id),
                rating: Set(rating),
                comment: Set(comment),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };

    recompute_product_rating(conn, product_id).await?;

    Ok(saved)
}

pub async fn delete_rating<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    rating_id: i32,
) -> Result<(), ApiError> {
    let rating = product_rating::Entity::find_by_id(rating_id)
        .filter(product_rating::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Rating not found".to_owned()))?;

    let product_id = rating.product_id;
    rating.delete(conn).await?;

    recompute_product_rating(conn, product_id).await
}

/// Recompute a product's aggregate from the rating rows: plain arithmetic
/// mean and count, exactly 0/0 when no ratings remain.
pub async fn recompute_product_rating<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<(), ApiError> {
    let values: Vec<i32> = product_rating::Entity::find()
        .filter(product_rating::Column::ProductId.eq(product_id))
        .select_only()
        .column(product_rating::Column::Rating)
        .into_tuple()
        .all(conn)
        .await?;

    let product = product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    let mut product: product::ActiveModel = product.into();
    if values.is_empty() {
        product.rating = Set(0.0);
        product.rating_count = Set(0);
    } else {
        let sum: i64 = values.iter().map(|v| *v as i64).sum();
        product.rating = Set(sum as f64 / values.len() as f64);
        product.rating_count = Set(values.len() as u32);
    }
    product.update(conn).await?;

    Ok(())
}

/// Ratings for a product, newest first, with the rater's display name.
/// Page floors to 1; limit falls back to 10 and is capped at 50.
pub async fn product_ratings<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    page: Option<u64>,
    limit: Option<u64>,
) -> Result<RatingPage, ApiError> {
    let page = page.unwrap_or(1).max(1);
    let limit = match limit {
        Some(value) if value >= 1 => value.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    };

    let total = product_rating::Entity::find()
        .filter(product_rating::Column::ProductId.eq(product_id))
        .count(conn)
        .await?;

    let rows = product_rating::Entity::find()
        .filter(product_rating::Column::ProductId.eq(product_id))
        .order_by_desc(product_rating::Column::CreatedAt)
        .find_also_related(user::Entity)
        .limit(limit)
        .offset((page - 1) * limit)
        .all(conn)
        .await?;

    let ratings = rows
        .into_iter()
        .map(|(rating, rater)| RatingView {
            id: rating.id,
            product_id: rating.product_id,
            user_id: rating.user_id,
            rating: rating.rating,
            comment: rating.comment,
            created_at: rating.created_at,
            user_display_name: rater.map(|u| u.display_name),
        })
        .collect();

    Ok(RatingPage {
        ratings,
        total,
        page,
        limit,
    })
}
