//! Order API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::core::ServerState;
use crate::repository::{FindAllPage, RepoError};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderCreate, OrderPage, OrderStatusUpdate, StatusTransition};

/// Fresh IDs drawn before giving up on a create
const MAX_ID_ATTEMPTS: usize = 3;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub cursor: Option<String>,
}

/// GET /orders?cursor=N - 分页获取订单
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<OrderPage>> {
    let cursor = match query.cursor.as_deref() {
        None | Some("") => 0,
        Some(raw) => parse_u64("cursor", raw)?,
    };

    let result = state
        .orders
        .find_all(FindAllPage::new(cursor, state.page_size()))
        .await
        .inspect_err(|e| tracing::error!(cursor, error = %e, "Failed to list orders"))?;

    Ok(Json(OrderPage {
        items: result.orders,
        next: result.cursor,
    }))
}

/// GET /orders/{id} - 获取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let id = parse_u64("id", &id)?;
    let order = state.orders.find_by_id(id).await.inspect_err(log_failure)?;
    Ok(Json(order))
}

/// POST /orders - 创建订单
pub async fn create(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Order>)> {
    let payload: OrderCreate = decode_body(&body)?;

    let mut order = Order::new(0, payload.customer_id, payload.line_items, Utc::now());
    for attempt in 1..=MAX_ID_ATTEMPTS {
        order.order_id = state.next_order_id();
        match state.orders.insert(&order).await {
            Ok(()) => {
                tracing::info!(order_id = order.order_id, "Order created");
                return Ok((StatusCode::CREATED, Json(order)));
            }
            Err(RepoError::AlreadyExists(key)) => {
                tracing::warn!(key = %key, attempt, "Order ID collision, drawing a new one");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to insert order");
                return Err(e.into());
            }
        }
    }

    tracing::error!(attempts = MAX_ID_ATTEMPTS, "Every drawn order ID was taken");
    Err(AppError::with_message(
        ErrorCode::InternalError,
        "Could not allocate a free order ID",
    )
    .with_detail("attempts", MAX_ID_ATTEMPTS))
}

/// PUT /orders/{id} - 更新订单状态
///
/// Only `unshipped -> shipped -> completed` is accepted; anything else is a
/// 400 and the stored order is left alone.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Order>> {
    let payload: OrderStatusUpdate = decode_body(&body)?;
    let id = parse_u64("id", &id)?;
    let transition: StatusTransition = payload.status.parse()?;

    let mut order = state.orders.find_by_id(id).await.inspect_err(log_failure)?;
    order.apply(transition, Utc::now())?;
    state.orders.update(&order).await.inspect_err(log_failure)?;

    tracing::info!(order_id = id, status = ?order.status(), "Order status updated");
    Ok(Json(order))
}

/// DELETE /orders/{id} - 删除订单
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_u64("id", &id)?;
    state.orders.delete_by_id(id).await.inspect_err(log_failure)?;

    tracing::info!(order_id = id, "Order deleted");
    Ok(StatusCode::OK)
}

fn parse_u64(param: &'static str, raw: &str) -> AppResult<u64> {
    raw.parse().map_err(|_| {
        AppError::invalid_format(format!("{param} must be an unsigned integer"))
            .with_detail("param", param)
            .with_detail("value", raw)
    })
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_format(format!("Invalid request body: {e}")))
}

fn log_failure(err: &RepoError) {
    if !matches!(err, RepoError::NotFound(_)) {
        tracing::error!(error = %err, "Order repository failure");
    }
}
