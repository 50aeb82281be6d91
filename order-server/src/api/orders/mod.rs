//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /orders | GET | 分页列出订单 (`?cursor=N`) |
//! | /orders | POST | 创建订单 |
//! | /orders/{id} | GET | 获取订单 |
//! | /orders/{id} | PUT | 更新订单状态 |
//! | /orders/{id} | DELETE | 删除订单 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
