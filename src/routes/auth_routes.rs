use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::entities::hash_password;
use crate::middleware::auth::generate_token;
use crate::middleware::logging::{to_response, ApiError};

//ROUTERS
pub fn auth_routes() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
}

//ROUTES
async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateUser>,
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

    let password = match hash_password(&payload.password) {
        Ok(password) => password,
        Err(_) => {
            return ApiError::Internal("Failed to hash password".to_owned()).into_response();
        }
    };

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        password: Set(password),
        display_name: Set(payload.display_name),
        role: Set(payload.role.unwrap_or(Role::User)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_user.insert(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => to_response(
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "message": "User registered successfully"
                    })),
                ),
                Ok(()),
            ),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            match ApiError::from(err) {
                ApiError::Conflict(_) => {
                    ApiError::Conflict("Username already exists".to_owned()).into_response()
                }
                other => other.into_response(),
            }
        }
    }
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UserLogin>,
) -> Response {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(&*payload.username))
        .one(&*db)
        .await;

    let model = match result {
        Ok(Some(model)) => model,
        Ok(None) => {
            return ApiError::Unauthorized("Invalid username or password".to_owned())
                .into_response();
        }
        Err(err) => return ApiError::from(err).into_response(),
    };

    if model.check_hash(&payload.password).is_err() {
        return ApiError::Unauthorized("Invalid username or password".to_owned()).into_response();
    }

    match generate_token(model.id, model.role.to_string()).await {
        Ok(token) => to_response(
            Json(json!({
                "token": token
            })),
            Ok(()),
        ),
        Err(_) => ApiError::Internal("Failed to generate token".to_owned()).into_response(),
    }
}

//Structs
#[derive(Deserialize, Validate)]
struct CreateUser {
    #[validate(length(min = 3, max = 32))]
    username: String,
    #[validate(length(min = 8))]
    password: String,
    #[validate(length(min = 1, max = 64))]
    display_name: String,
    role: Option<Role>,
}

#[derive(Deserialize)]
struct UserLogin {
    username: String,
    password: String,
}
