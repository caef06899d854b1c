use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::logging::to_response;
use crate::services::{catalog, catalog::ProductSearchParams, images, ratings};

//ROUTERS
pub fn product_routes() -> Router {
    Router::new()
        .route("/product", get(search_products))
        .route("/product/featured", get(featured_products))
        .route("/product/:id", get(get_product))
        .route("/product/:id/related", get(related_products))
        .route("/product/:id/images", get(product_images))
        .route("/product/:id/ratings", get(product_ratings))
}

//ROUTES
async fn search_products(
    Query(params): Query<ProductSearchParams>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::search_products(&*db, params).await {
        Ok(page) => to_response(Json(page), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::get_product(&*db, id).await {
        Ok(view) => to_response(Json(view), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn featured_products(
    Query(params): Query<LimitQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::featured_products(&*db, params.limit).await {
        Ok(views) => to_response(Json(views), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn related_products(
    Path(id): Path<i32>,
    Query(params): Query<LimitQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::related_products(&*db, id, params.limit).await {
        Ok(views) => to_response(Json(views), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn product_images(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match images::product_images(&*db, id).await {
        Ok(list) => to_response(Json(list), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn product_ratings(
    Path(id): Path<i32>,
    Query(params): Query<RatingsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match ratings::product_ratings(&*db, id, params.page, params.limit).await {
        Ok(page) => to_response(Json(page), Ok(())),
        Err(err) => err.into_response(),
    }
}

//Structs
#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<u64>,
}

#[derive(Deserialize)]
struct RatingsQuery {
    page: Option<u64>,
    limit: Option<u64>,
}
