//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单管理接口
//! - `GET /` - 纯文本存活响应

use axum::{Router, routing::get};

use crate::core::ServerState;

pub mod health;
pub mod orders;

/// Root route
pub fn root_router() -> Router<ServerState> {
    Router::new().route("/", get(root))
}

async fn root() -> &'static str {
    "No content"
}
