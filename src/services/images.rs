use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::{product, product_image};
use crate::middleware::logging::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpdate {
    pub alt_text: Option<String>,
    pub display_order: Option<i32>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderEntry {
    pub image_id: i32,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReorderFailure {
    pub image_id: i32,
    pub error: String,
}

/// Outcome of a bulk reorder. Bad entries never abort the batch: every
/// failure is collected and reported next to the number of rows that did
/// get their new position.
#[derive(Debug, Clone, Serialize)]
pub struct ReorderOutcome {
    pub updated: u32,
    pub failed: Vec<ReorderFailure>,
}

pub async fn product_images<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<Vec<product_image::Model>, ApiError> {
    let images = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .order_by_asc(product_image::Column::DisplayOrder)
        .all(conn)
        .await?;

    Ok(images)
}

pub async fn primary_image<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<Option<product_image::Model>, ApiError> {
    let image = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .filter(product_image::Column::IsPrimary.eq(true))
        .one(conn)
        .await?;

    Ok(image)
}

/// Update image details, scoped to the seller's store. Promoting an image
/// to primary demotes the product's previous primary first, so a product
/// never carries two.
pub async fn update_image<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    image_id: i32,
    updates: ImageUpdate,
) -> Result<product_image::Model, ApiError> {
    let image = image_for_store(conn, store_id, image_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_owned()))?;

    if updates.is_primary == Some(true) && !image.is_primary {
        let current = product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(image.product_id))
            .filter(product_image::Column::IsPrimary.eq(true))
            .one(conn)
            .await?;
        if let Some(current) = current {
            let mut current: product_image::ActiveModel = current.into();
            current.is_primary = Set(false);
            current.update(conn).await?;
        }
    }

    let mut image: product_image::ActiveModel = image.into();
    if let Some(alt_text) = updates.alt_text {
        image.alt_text = Set(alt_text);
    }
    if let Some(display_order) = updates.display_order {
        image.display_order = Set(display_order);
    }
    if let Some(is_primary) = updates.is_primary {
        image.is_primary = Set(is_primary);
    }

    let image = image.update(conn).await?;
    Ok(image)
}

/// Bulk reposition a store's gallery. Entries pointing at unknown images,
/// or at images of another store's products, are collected as per-item
/// failures while the rest of the batch is applied.
pub async fn reorder_images<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    entries: Vec<ReorderEntry>,
) -> Result<ReorderOutcome, ApiError> {
    let mut updated = 0;
    let mut failed = Vec::new();

    for entry in entries {
        let image = match image_for_store(conn, store_id, entry.image_id).await? {
            Some(image) => image,
            None => {
                failed.push(ReorderFailure {
                    image_id: entry.image_id,
                    error: "Image not found for this store".to_owned(),
                });
                continue;
            }
        };

        let mut image: product_image::ActiveModel = image.into();
        image.display_order = Set(entry.display_order);
        match image.update(conn).await {
            Ok(_) => updated += 1,
            Err(err) => failed.push(ReorderFailure {
                image_id: entry.image_id,
                error: ApiError::from(err).to_string(),
            }),
        }
    }

    Ok(ReorderOutcome { updated, failed })
}

async fn image_for_store<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    image_id: i32,
) -> Result<Option<product_image::Model>, ApiError> {
    let row = product_image::Entity::find_by_id(image_id)
        .find_also_related(product::Entity)
        .one(conn)
        .await?;

    match row {
        Some((image, Some(product))) if product.store_id == store_id => Ok(Some(image)),
        _ => Ok(None),
    }
}
