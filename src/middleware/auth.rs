use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use dotenvy::dotenv;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::logging::ApiError;

pub async fn auth_middleware(
    State(required_role): State<Role>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let db = req
        .extensions()
        .get::<Arc<DatabaseConnection>>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("Database extension is missing".to_owned()))?;

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Malformed Authorization header".to_owned()))?,
        None => {
            return Err(ApiError::Unauthorized(
                "Missing Authorization header".to_owned(),
            ));
        }
    };

    let claims = validate_token(db, token, required_role)
        .await
        .map_err(|err| match err {
            AuthMiddlewareError::InternalServerError => {
                ApiError::Internal("Failed to validate token".to_owned())
            }
            AuthMiddlewareError::InvalidUserOrRole => {
                ApiError::Forbidden("You do not have permission to perform this action".to_owned())
            }
            other => ApiError::Unauthorized(other.to_string()),
        })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub exp: usize,
}

pub async fn generate_token(user_id: i32, role: String) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims { user_id, role, exp };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_secret_key().as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub async fn validate_token(
    db: Arc<DatabaseConnection>,
    token: &str,
    required_role: Role,
) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_secret_key().as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::TokenExpired)?;

    let claims = token_data.claims;

    let role = Role::from_str(&claims.role)
        .map_err(|_| AuthMiddlewareError::ValidationFail)?;

    match UserEntity::find_by_id(claims.user_id)
        .filter(user::Column::Role.eq(role))
        .one(&*db)
        .await
    {
        Ok(Some(_)) => {
            if role == required_role {
                Ok(claims)
            } else {
                Err(AuthMiddlewareError::InvalidUserOrRole)
            }
        }
        Ok(None) => Err(AuthMiddlewareError::InvalidUserOrRole),
        Err(_) => Err(AuthMiddlewareError::InternalServerError),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error")]
    InternalServerError,
}

fn get_secret_key() -> String {
    dotenv().ok();
    std::env::var("SECRET").expect("SECRET not found in .env file")
}
