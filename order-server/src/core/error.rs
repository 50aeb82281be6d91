use thiserror::Error;

use crate::store::StoreError;

/// 服务器启动/运行错误
///
/// 请求级错误走 [`shared::error::AppError`]，这里只覆盖进程级故障。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("存储不可用: {0}")]
    Store(#[from] StoreError),

    #[error("网络错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
