use axum::{
    extract::{Extension, Path, Query},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::entities::{order, user::Role};
use crate::middleware::{
    auth::{auth_middleware, Claims},
    logging::{to_response, ApiError},
};
use crate::services::{
    images,
    images::{ImageUpdate, ReorderEntry},
    orders,
    orders::OrderFilters,
    stores,
};

//ROUTERS
pub fn seller_routes() -> Router {
    Router::new()
        .route("/store", get(store_overview))
        .route("/orders", get(store_orders))
        .route("/orders/:id", get(order_details))
        .route("/orders/:id/status", patch(patch_order_status))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/refund", post(refund_order))
        .route("/analytics", get(order_analytics))
        .route("/images/reorder", post(reorder_images))
        .route("/images/:id", patch(patch_image))
        .layer(middleware::from_fn_with_state(Role::Seller, auth_middleware))
}

//ROUTES
async fn store_overview(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let store = match stores::store_for_owner(&*db, claims.user_id).await {
        Ok(store) => store,
        Err(err) => return err.into_response(),
    };

    match stores::store_overview(&*db, store.id).await {
        Ok(overview) => to_response(Json(overview), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn store_orders(
    Query(query): Query<OrdersQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let store = match stores::store_for_owner(&*db, claims.user_id).await {
        Ok(store) => store,
        Err(err) => return err.into_response(),
    };

    let filters = match query.to_filters() {
        Ok(filters) => filters,
        Err(err) => return err.into_response(),
    };

    match orders::store_orders(&*db, store.id, filters, query.page, query.page_size).await {
        Ok(page) => to_response(Json(page), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn order_details(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let store = match stores::store_for_owner(&*db, claims.user_id).await {
        Ok(store) => store,
        Err(err) => return err.into_response(),
    };

    match orders::order_with_items(&*db, store.id, id).await {
        Ok(details) => to_response(Json(details), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn patch_order_status(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchStatus>,
) -> Response {
    let status = match order::Status::from_str(&payload.status) {
        Ok(status) => status,
        Err(err) => return ApiError::Validation(err).into_response(),
    };

    write_status(db, claims, id, status).await
}

async fn cancel_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    write_status(db, claims, id, order::Status::Cancelled).await
}

async fn refund_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    write_status(db, claims, id, order::Status::Refunded).await
}

async fn order_analytics(
    Query(query): Query<AnalyticsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let store = match stores::store_for_owner(&*db, claims.user_id).await {
        Ok(store) => store,
        Err(err) => return err.into_response(),
    };

    let start = match parse_date(query.start_date.as_deref()) {
        Ok(value) => value,
        Err(err) => return err.into_response(),
    };
    let end = match parse_date(query.end_date.as_deref()) {
        Ok(value) => value,
        Err(err) => return err.into_response(),
    };

    match orders::order_analytics(&*db, store.id, start, end).await {
        Ok(analytics) => to_response(Json(analytics), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn patch_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ImageUpdate>,
) -> Response {
    let store = match stores::store_for_owner(&*db, claims.user_id).await {
        Ok(store) => store,
        Err(err) => return err.into_response(),
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    match images::update_image(&txn, store.id, id, payload).await {
        Ok(image) => match txn.commit().await {
            Ok(_) => to_response(Json(image), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn reorder_images(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReorderImages>,
) -> Response {
    let store = match stores::store_for_owner(&*db, claims.user_id).await {
        Ok(store) => store,
        Err(err) => return err.into_response(),
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    //Partial failure is part of the outcome, not an error: the valid
    //entries still commit and every bad one is listed in the body.
    match images::reorder_images(&txn, store.id, payload.entries).await {
        Ok(outcome) => match txn.commit().await {
            Ok(_) => to_response(Json(outcome), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

async fn write_status(
    db: Arc<DatabaseConnection>,
    claims: Claims,
    order_id: i32,
    status: order::Status,
) -> Response {
    let store = match stores::store_for_owner(&*db, claims.user_id).await {
        Ok(store) => store,
        Err(err) => return err.into_response(),
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return ApiError::Internal("Failed to create transaction".to_owned()).into_response();
        }
    };

    match orders::update_order_status(&txn, store.id, order_id, status).await {
        Ok(updated) => match txn.commit().await {
            Ok(_) => to_response(Json(updated), Ok(())),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|_| ApiError::Validation(format!("Invalid date: {}", raw))),
    }
}

//Structs
#[derive(Deserialize)]
struct OrdersQuery {
    ///Comma separated status list, e.g. `pending,processing`.
    status: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    customer_id: Option<i32>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    page: Option<u64>,
    page_size: Option<u64>,
}

impl OrdersQuery {
    fn to_filters(&self) -> Result<OrderFilters, ApiError> {
        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => {
                let mut parsed = Vec::new();
                for part in raw.split(',').filter(|part| !part.is_empty()) {
                    parsed.push(
                        order::Status::from_str(part).map_err(ApiError::Validation)?,
                    );
                }
                Some(parsed)
            }
        };

        Ok(OrderFilters {
            status,
            start_date: parse_date(self.start_date.as_deref())?,
            end_date: parse_date(self.end_date.as_deref())?,
            customer_id: self.customer_id,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        })
    }
}

#[derive(Deserialize)]
struct PatchStatus {
    status: String,
}

#[derive(Deserialize)]
struct ReorderImages {
    entries: Vec<ReorderEntry>,
}

#[derive(Deserialize)]
struct AnalyticsQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}
