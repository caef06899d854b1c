use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::Role;
use crate::middleware::{
    auth::{auth_middleware, Claims},
    logging::{to_response, ApiError},
};
use crate::services::cart;

//ROUTERS
pub fn cart_routes() -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_product).delete(clear_cart))
        .route("/cart/promo", post(apply_promo))
        .route("/cart/:id", patch(patch_entry).delete(remove_product))
        .layer(middleware::from_fn_with_state(Role::User, auth_middleware))
}

//ROUTES
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::get_cart(&*db, claims.user_id).await {
        Ok(view) => to_response(Json(view), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddProduct>,
) -> Response {
    if let Err(err) = payload.validate() {
        return ApiError::from(err).into_response();
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    //The merge against an existing line and the stock re-check commit as
    //one unit, so concurrent adds cannot lose an increment.
    match cart::add_to_cart(&txn, claims.user_id, payload.product_id, payload.quantity).await {
        Ok(view) => match txn.commit().await {
            Ok(_) => to_response((StatusCode::CREATED, Json(view)), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn patch_entry(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchCart>,
) -> Response {
    if let Err(err) = payload.validate() {
        return ApiError::from(err).into_response();
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    match cart::update_cart_item(&txn, claims.user_id, id, payload.quantity).await {
        Ok(view) => match txn.commit().await {
            Ok(_) => to_response(Json(view), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn remove_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    match cart::remove_from_cart(&txn, claims.user_id, id).await {
        Ok(view) => match txn.commit().await {
            Ok(_) => to_response(Json(view), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn clear_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    match cart::clear_cart(&txn, claims.user_id).await {
        Ok(view) => match txn.commit().await {
            Ok(_) => to_response(Json(view), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn apply_promo(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplyPromo>,
) -> Response {
    if let Err(err) = payload.validate() {
        return ApiError::from(err).into_response();
    }

    //Stateless: nothing about the promotion is written back.
    match cart::apply_promo_code(&*db, claims.user_id, &payload.code).await {
        Ok(view) => to_response(Json(view), Ok(())),
        Err(err) => err.into_response(),
    }
}

//Structs
static PROMO_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{3,32}$").unwrap());

#[derive(Deserialize, Debug, Validate)]
struct AddProduct {
    product_id: i32,
    #[validate(range(min = 1))]
    quantity: u32,
}

#[derive(Deserialize, Validate)]
struct PatchCart {
    #[validate(range(min = 1))]
    quantity: u32,
}

#[derive(Deserialize, Validate)]
struct ApplyPromo {
    #[validate(regex(path = *PROMO_CODE_REGEX))]
    code: String,
}
