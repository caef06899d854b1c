use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{category, product, product_image};
use crate::middleware::logging::ApiError;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSearchParams {
    pub query: Option<String>,
    /// Numeric category id, or a category slug.
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub featured: Option<bool>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub store_id: i32,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub rating: f64,
    pub rating_count: u32,
    pub featured: bool,
    pub category: Option<CategoryView>,
    pub images: Vec<product_image::Model>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub products: Vec<ProductView>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

fn validate_search_params(params: &ProductSearchParams) -> Result<(), ApiError> {
    if let Some(min) = params.min_price {
        if min < 0.0 {
            return Err(ApiError::Validation(
                "Minimum price must be a non-negative number".to_owned(),
            ));
        }
    }
    if let Some(max) = params.max_price {
        if max < 0.0 {
            return Err(ApiError::Validation(
                "Maximum price must be a non-negative number".to_owned(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (params.min_price, params.max_price) {
        if min > max {
            return Err(ApiError::Validation(
                "Minimum price cannot be greater than maximum price".to_owned(),
            ));
        }
    }
    if let Some(rating) = params.min_rating {
        if !(1.0..=5.0).contains(&rating) {
            return Err(ApiError::Validation(
                "Minimum rating must be between 1 and 5".to_owned(),
            ));
        }
    }
    Ok(())
}

/// Search the catalog. The optional predicates are composed in one fixed
/// order (query, category, price bounds, rating floor, featured) so two
/// requests with the same parameters always build the same statement.
pub async fn search_products<C: ConnectionTrait>(
    conn: &C,
    params: ProductSearchParams,
) -> Result<SearchPage, ApiError> {
    validate_search_params(&params)?;

    let page = match params.page {
        Some(value) if value >= 1 => value,
        _ => 1,
    };
    let limit = match params.limit {
        Some(value) if value >= 1 => value.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    };

    //Filter zone
    let mut condition = Condition::all();
    if let Some(query) = params.query.as_deref() {
        let query = query.trim();
        if !query.is_empty() {
            condition = condition.add(product::Column::Title.contains(query));
        }
    }
    if let Some(category) = params.category.as_deref() {
        match category.parse::<i32>() {
            Ok(id) => condition = condition.add(product::Column::CategoryId.eq(id)),
            Err(_) => {
                let resolved = category::Entity::find()
                    .filter(category::Column::Slug.eq(category))
                    .one(conn)
                    .await?;
                match resolved {
                    Some(found) => {
                        condition = condition.add(product::Column::CategoryId.eq(found.id))
                    }
                    None => {
                        return Ok(SearchPage {
                            products: vec![],
                            total: 0,
                            page,
                            limit,
                            total_pages: 0,
                        });
                    }
                }
            }
        }
    }
    if let Some(min) = params.min_price {
        condition = condition.add(product::Column::Price.gte(min));
    }
    if let Some(max) = params.max_price {
        condition = condition.add(product::Column::Price.lte(max));
    }
    if let Some(rating) = params.min_rating {
        condition = condition.add(product::Column::Rating.gte(rating));
    }
    if let Some(featured) = params.featured {
        condition = condition.add(product::Column::Featured.eq(featured));
    }

    //Sorting zone
    let order = match params.order.as_deref() {
        Some("asc") => sea_orm::Order::Asc,
        _ => sea_orm::Order::Desc,
    };
    let sort_column = match params.sort_by.as_deref() {
        Some("title") => product::Column::Title,
        Some("price") => product::Column::Price,
        Some("rating") => product::Column::Rating,
        Some("rating_count") => product::Column::RatingCount,
        Some("updated_at") => product::Column::UpdatedAt,
        _ => product::Column::CreatedAt,
    };

    let total = product::Entity::find()
        .filter(condition.clone())
        .count(conn)
        .await?;

    let rows = product::Entity::find()
        .filter(condition)
        .order_by(sort_column, order)
        .find_also_related(category::Entity)
        .limit(limit)
        .offset((page - 1) * limit)
        .all(conn)
        .await?;

    let products = hydrate(conn, rows).await?;
    let total_pages = total.div_ceil(limit);

    Ok(SearchPage {
        products,
        total,
        page,
        limit,
        total_pages,
    })
}

pub async fn get_product<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<ProductView, ApiError> {
    let row = product::Entity::find_by_id(product_id)
        .find_also_related(category::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    let mut products = hydrate(conn, vec![row]).await?;
    Ok(products.remove(0))
}

pub async fn featured_products<C: ConnectionTrait>(
    conn: &C,
    limit: Option<u64>,
) -> Result<Vec<ProductView>, ApiError> {
    let rows = product::Entity::find()
        .filter(product::Column::Featured.eq(true))
        .order_by_desc(product::Column::CreatedAt)
        .find_also_related(category::Entity)
        .limit(limit.unwrap_or(8))
        .all(conn)
        .await?;

    hydrate(conn, rows).await
}

/// Products in the same category, best rated first.
pub async fn related_products<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    limit: Option<u64>,
) -> Result<Vec<ProductView>, ApiError> {
    let product = product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    let rows = product::Entity::find()
        .filter(product::Column::CategoryId.eq(product.category_id))
        .filter(product::Column::Id.ne(product_id))
        .order_by_desc(product::Column::Rating)
        .find_also_related(category::Entity)
        .limit(limit.unwrap_or(4))
        .all(conn)
        .await?;

    hydrate(conn, rows).await
}

async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<(product::Model, Option<category::Model>)>,
) -> Result<Vec<ProductView>, ApiError> {
    let product_ids: Vec<i32> = rows.iter().map(|(p, _)| p.id).collect();

    let mut images_by_product: HashMap<i32, Vec<product_image::Model>> = HashMap::new();
    if !product_ids.is_empty() {
        let images = product_image::Entity::find()
            .filter(product_image::Column::ProductId.is_in(product_ids))
            .order_by_asc(product_image::Column::DisplayOrder)
            .all(conn)
            .await?;
        for image in images {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push(image);
        }
    }

    Ok(rows
        .into_iter()
        .map(|(p, c)| ProductView {
            images: images_by_product.remove(&p.id).unwrap_or_default(),
            category: c.map(|c| CategoryView {
                id: c.id,
                name: c.name,
                slug: c.slug,
            }),
            id: p.id,
            store_id: p.store_id,
            title: p.title,
            description: p.description,
            price: p.price,
            stock: p.stock,
            rating: p.rating,
            rating_count: p.rating_count,
            featured: p.featured,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
        .collect())
}
