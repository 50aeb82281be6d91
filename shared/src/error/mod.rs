//! Error system shared by the server and its clients
//!
//! - [`ErrorCode`]: numeric code carried in every error body
//! - [`ErrorCategory`]: code range grouping
//! - [`AppError`]: handler error, renders as an HTTP response
//! - [`ApiResponse`]: the JSON error body
//!
//! ```
//! use shared::error::{AppError, ApiResponse};
//!
//! let err = AppError::invalid_format("cursor must be an unsigned integer")
//!     .with_detail("param", "cursor");
//!
//! let body = ApiResponse::from(&err);
//! assert_eq!(body.code, 6);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
