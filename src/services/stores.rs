use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use serde::Serialize;

use crate::entities::{order, product, store};
use crate::middleware::logging::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct StoreOverview {
    pub store: store::Model,
    pub product_count: u64,
    pub order_count: u64,
    pub lifetime_revenue: f64,
    pub average_rating: f64,
}

/// A seller owns at most one store; the dashboard resolves it from the
/// authenticated owner.
pub async fn store_for_owner<C: ConnectionTrait>(
    conn: &C,
    owner_id: i32,
) -> Result<store::Model, ApiError> {
    store::Entity::find()
        .filter(store::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store not found".to_owned()))
}

pub async fn store_overview<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
) -> Result<StoreOverview, ApiError> {
    let store = store::Entity::find_by_id(store_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store not found".to_owned()))?;

    let product_count = product::Entity::find()
        .filter(product::Column::StoreId.eq(store_id))
        .count(conn)
        .await?;

    let order_count = order::Entity::find()
        .filter(order::Column::StoreId.eq(store_id))
        .count(conn)
        .await?;

    let order_rows: Vec<(order::Status, f64)> = order::Entity::find()
        .filter(order::Column::StoreId.eq(store_id))
        .select_only()
        .column(order::Column::Status)
        .column(order::Column::TotalAmount)
        .into_tuple()
        .all(conn)
        .await?;

    let lifetime_revenue: f64 = order_rows
        .iter()
        .filter(|(status, _)| {
            !matches!(*status, order::Status::Cancelled | order::Status::Refunded)
        })
        .map(|(_, amount)| amount)
        .sum();

    //Mean over products that actually have ratings; an unrated catalog
    //reads as 0.
    let rated: Vec<f64> = product::Entity::find()
        .filter(product::Column::StoreId.eq(store_id))
        .filter(product::Column::RatingCount.gt(0))
        .select_only()
        .column(product::Column::Rating)
        .into_tuple()
        .all(conn)
        .await?;

    let average_rating = if rated.is_empty() {
        0.0
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    };

    Ok(StoreOverview {
        store,
        product_count,
        order_count,
        lifetime_revenue,
        average_rating,
    })
}
