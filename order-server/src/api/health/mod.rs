//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 服务及存储状态 |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "service": "order-server",
//!   "version": "0.1.0",
//!   "uptime_seconds": 42,
//!   "store": { "backend": "redis", "status": "ok", "latency_ms": 1 }
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::Instant;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    service: &'static str,
    version: &'static str,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    store: CheckResult,
}

/// 单项检查结果
#[derive(Serialize)]
pub struct CheckResult {
    backend: &'static str,
    /// 状态 (ok | error)
    status: &'static str,
    /// 延迟 (毫秒)
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// 健康检查
///
/// 始终返回 200，存储不可达时 status 为 degraded
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let backend = state.store.backend();

    let started = Instant::now();
    let store = match state.store.ping().await {
        Ok(()) => CheckResult {
            backend,
            status: "ok",
            latency_ms: Some(started.elapsed().as_millis() as u64),
            message: None,
        },
        Err(e) => {
            tracing::warn!(backend, error = %e, "Store health check failed");
            CheckResult {
                backend,
                status: "error",
                latency_ms: None,
                message: Some(e.to_string()),
            }
        }
    };

    Json(HealthResponse {
        status: if store.status == "ok" { "ok" } else { "degraded" },
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
        store,
    })
}
