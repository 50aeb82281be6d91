//! Order Server - 订单管理 HTTP 服务
//!
//! # 架构概述
//!
//! - **存储** (`store`): 键值存储抽象，Redis 与内存两种实现
//! - **仓储** (`repository`): 订单记录与索引集合的读写
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── store/         # KvStore trait, RedisStore, MemoryStore
//! ├── repository/    # OrderRepository
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装与中间件
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod core;
pub mod repository;
pub mod routes;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use repository::OrderRepository;
pub use routes::build_app;
pub use store::{KvStore, MemoryStore, RedisStore};

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 设置运行环境: 加载 .env、读取配置、初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    utils::init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    Ok(config)
}
