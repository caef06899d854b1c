pub mod auth_routes;
pub mod cart_routes;
pub mod product_routes;
pub mod profile_routes;
pub mod rating_routes;
pub mod seller_routes;
pub mod wishlist_routes;

use axum::{middleware, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::middleware::logging::logging_middleware;
use {
    auth_routes::auth_routes, cart_routes::cart_routes, product_routes::product_routes,
    profile_routes::profile_routes, rating_routes::rating_routes, seller_routes::seller_routes,
    wishlist_routes::wishlist_routes,
};

pub fn api_router(db: Arc<DatabaseConnection>) -> Router {
    let auth_routes = auth_routes();
    let product_routes = product_routes();
    let cart_routes = cart_routes();
    let rating_routes = rating_routes();
    let wishlist_routes = wishlist_routes();
    let profile_routes = profile_routes();
    let seller_routes = seller_routes();

    Router::new()
        .merge(auth_routes)
        .nest("/api", product_routes)
        .nest("/api", cart_routes)
        .nest("/api", rating_routes)
        .nest("/api", wishlist_routes)
        .nest("/api", profile_routes)
        .nest("/api/seller", seller_routes)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(db))
}
