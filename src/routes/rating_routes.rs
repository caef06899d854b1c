use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::Role;
use crate::middleware::{
    auth::{auth_middleware, Claims},
    logging::{to_response, ApiError},
};
use crate::services::ratings;

//ROUTERS
pub fn rating_routes() -> Router {
    Router::new()
        .route("/rating", post(add_rating))
        .route("/rating/:id", delete(delete_rating))
        .layer(middleware::from_fn_with_state(Role::User, auth_middleware))
}

//ROUTES
async fn add_rating(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddRating>,
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

    //Upsert and aggregate recompute land in the same transaction; the
    //product can never be read with a stale mean.
    match ratings::add_rating(
        &txn,
        claims.user_id,
        payload.product_id,
        payload.rating,
        payload.comment,
    )
    .await
    {
        Ok(saved) => match txn.commit().await {
            Ok(_) => to_response((StatusCode::CREATED, Json(saved)), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn delete_rating(
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

    match ratings::delete_rating(&txn, claims.user_id, id).await {
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
#[derive(Deserialize, Debug, Validate)]
struct AddRating {
    product_id: i32,
    #[validate(range(min = 1, max = 5))]
    rating: i32,
    comment: Option<String>,
}
