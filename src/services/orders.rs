use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{order, order_item, product};
use crate::middleware::logging::ApiError;

#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub status: Option<Vec<order::Status>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub customer_id: Option<i32>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<order::Model>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub id: i32,
    pub product_id: i32,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
    pub product_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: order::Model,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderAnalytics {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub orders_by_status: HashMap<String, u64>,
    pub average_order_value: f64,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub store_id: i32,
    pub total_amount: f64,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Pass-through insert for checkout flows living outside this layer. The
/// order reference is a fresh v4 uuid.
pub async fn create_order<C: ConnectionTrait>(
    conn: &C,
    new_order: NewOrder,
    items: Vec<NewOrderItem>,
) -> Result<order::Model, ApiError> {
    let now = Utc::now();
    let order = order::ActiveModel {
        reference: Set(Uuid::new_v4().to_string()),
        user_id: Set(new_order.user_id),
        store_id: Set(new_order.store_id),
        status: Set(order::Status::Pending),
        total_amount: Set(new_order.total_amount),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    for item in items {
        order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    Ok(order)
}

/// Orders of a store, newest first. Pass-through query; the filters mirror
/// what the seller dashboard offers.
pub async fn store_orders<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    filters: OrderFilters,
    page: Option<u64>,
    page_size: Option<u64>,
) -> Result<OrderPage, ApiError> {
    let page = match page {
        Some(value) if value >= 1 => value,
        _ => 1,
    };
    let page_size = match page_size {
        Some(value) if value >= 1 => value,
        _ => 10,
    };

    //Filter zone
    let mut condition = Condition::all().add(order::Column::StoreId.eq(store_id));
    if let Some(statuses) = filters.status {
        if !statuses.is_empty() {
            condition = condition.add(order::Column::Status.is_in(statuses));
        }
    }
    if let Some(start) = filters.start_date {
        condition = condition.add(order::Column::CreatedAt.gte(start));
    }
    if let Some(end) = filters.end_date {
        condition = condition.add(order::Column::CreatedAt.lte(end));
    }
    if let Some(customer_id) = filters.customer_id {
        condition = condition.add(order::Column::UserId.eq(customer_id));
    }
    if let Some(min) = filters.min_amount {
        condition = condition.add(order::Column::TotalAmount.gte(min));
    }
    if let Some(max) = filters.max_amount {
        condition = condition.add(order::Column::TotalAmount.lte(max));
    }

    let total = order::Entity::find()
        .filter(condition.clone())
        .count(conn)
        .await?;

    let orders = order::Entity::find()
        .filter(condition)
        .order_by_desc(order::Column::CreatedAt)
        .limit(page_size)
        .offset((page - 1) * page_size)
        .all(conn)
        .await?;

    Ok(OrderPage {
        orders,
        total,
        page,
        page_size,
    })
}

pub async fn order_with_items<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    order_id: i32,
) -> Result<OrderDetails, ApiError> {
    let order = order::Entity::find_by_id(order_id)
        .filter(order::Column::StoreId.eq(store_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_owned()))?;

    let rows = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .find_also_related(product::Entity)
        .all(conn)
        .await?;

    let items = rows
        .into_iter()
        .map(|(item, product)| OrderItemView {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.unit_price * item.quantity as f64,
            product_title: product.map(|p| p.title),
        })
        .collect();

    Ok(OrderDetails { order, items })
}

/// Status transitions are plain status writes; the store scope is the only
/// authorization.
pub async fn update_order_status<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    order_id: i32,
    status: order::Status,
) -> Result<order::Model, ApiError> {
    let existing = order::Entity::find_by_id(order_id)
        .filter(order::Column::StoreId.eq(store_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_owned()))?;

    let mut existing: order::ActiveModel = existing.into();
    existing.status = Set(status);
    existing.updated_at = Set(Utc::now());
    let updated = existing.update(conn).await?;

    Ok(updated)
}

pub async fn cancel_order<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    order_id: i32,
) -> Result<order::Model, ApiError> {
    update_order_status(conn, store_id, order_id, order::Status::Cancelled).await
}

pub async fn refund_order<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    order_id: i32,
) -> Result<order::Model, ApiError> {
    update_order_status(conn, store_id, order_id, order::Status::Refunded).await
}

/// In-code rollup over the store's orders in a date range. Cancelled and
/// refunded orders still show up in the per-status counts but are left out
/// of revenue and the average order value.
pub async fn order_analytics<C: ConnectionTrait>(
    conn: &C,
    store_id: i32,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<OrderAnalytics, ApiError> {
    let mut condition = Condition::all().add(order::Column::StoreId.eq(store_id));
    if let Some(start) = start_date {
        condition = condition.add(order::Column::CreatedAt.gte(start));
    }
    if let Some(end) = end_date {
        condition = condition.add(order::Column::CreatedAt.lte(end));
    }

    let rows: Vec<(order::Status, f64)> = order::Entity::find()
        .filter(condition)
        .select_only()
        .column(order::Column::Status)
        .column(order::Column::TotalAmount)
        .into_tuple()
        .all(conn)
        .await?;

    let mut orders_by_status: HashMap<String, u64> = HashMap::new();
    let mut total_revenue = 0.0;
    let mut counted: u64 = 0;

    for (status, amount) in &rows {
        *orders_by_status.entry(status.to_string()).or_insert(0) += 1;
        if !matches!(*status, order::Status::Cancelled | order::Status::Refunded) {
            total_revenue += *amount;
            counted += 1;
        }
    }

    let average_order_value = if counted > 0 {
        total_revenue / counted as f64
    } else {
        0.0
    };

    Ok(OrderAnalytics {
        total_orders: rows.len() as u64,
        total_revenue,
        orders_by_status,
        average_order_value,
    })
}
