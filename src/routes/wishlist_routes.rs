use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::{
    auth::{auth_middleware, Claims},
    logging::{to_response, ApiError},
};
use crate::services::wishlist;

//ROUTERS
pub fn wishlist_routes() -> Router {
    Router::new()
        .route("/wishlist", get(get_wishlist).post(add_entry))
        .route("/wishlist/:product_id", get(check_entry).delete(remove_entry))
        .layer(middleware::from_fn_with_state(Role::User, auth_middleware))
}

//ROUTES
async fn get_wishlist(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match wishlist::wishlist(&*db, claims.user_id).await {
        Ok(entries) => to_response(Json(entries), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn add_entry(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddWishlistEntry>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    match wishlist::add_to_wishlist(&txn, claims.user_id, payload.product_id).await {
        Ok(entry) => match txn.commit().await {
            Ok(_) => to_response((StatusCode::CREATED, Json(entry)), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn check_entry(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match wishlist::is_in_wishlist(&*db, claims.user_id, product_id).await {
        Ok(in_wishlist) => to_response(
            Json(json!({
                "in_wishlist": in_wishlist
            })),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}

async fn remove_entry(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    match wishlist::remove_from_wishlist(&txn, claims.user_id, product_id).await {
        Ok(()) => match txn.commit().await {
            Ok(_) => to_response(
                Json(json!({
                    "message": "Resource deleted successfully"
                })),
                Ok(()),
            ),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

//Structs
#[derive(Deserialize, Debug)]
struct AddWishlistEntry {
    product_id: i32,
}
