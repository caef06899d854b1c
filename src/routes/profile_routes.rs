use axum::{
    extract::Extension,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::{ActiveModel, Entity as UserEntity, Role};
use crate::middleware::{
    auth::{auth_middleware, Claims},
    logging::{to_response, ApiError},
};

pub fn profile_routes() -> Router {
    Router::new()
        .route("/profile", get(get_profile).patch(patch_profile))
        .layer(middleware::from_fn_with_state(Role::User, auth_middleware))
}

async fn get_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match UserEntity::find_by_id(claims.user_id).one(&*db).await {
        Ok(Some(model)) => to_response(
            Json(json!({
                "username": model.username,
                "display_name": model.display_name
            })),
            Ok(()),
        ),
        Ok(None) => ApiError::NotFound("User not found".to_owned()).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn patch_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchProfile>,
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

    let model = match UserEntity::find_by_id(claims.user_id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => return ApiError::NotFound("User not found".to_owned()).into_response(),
        Err(err) => return ApiError::from(err).into_response(),
    };

    let mut model: ActiveModel = model.into();
    model.display_name = Set(payload.display_name);

    match model.update(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => to_response(
                Json(json!({
                    "message": "Resource patched successfully"
                })),
                Ok(()),
            ),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            ApiError::from(err).into_response()
        }
    }
}

//Structs
#[derive(Deserialize, Validate)]
struct PatchProfile {
    #[validate(length(min = 1, max = 64))]
    display_name: String,
}
