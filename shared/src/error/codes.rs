//! Numeric error codes returned in every error body
//!
//! - 0xxx: request format
//! - 4xxx: orders
//! - 9xxx: system

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    /// Malformed JSON body or unparsable path/query number
    InvalidFormat = 6,

    OrderNotFound = 4001,
    /// Order key already taken in the store
    OrderAlreadyExists = 4002,
    OrderAlreadyShipped = 4003,
    OrderAlreadyCompleted = 4004,
    /// Completion requested before shipping
    OrderNotShipped = 4005,
    /// Requested status is neither `shipped` nor `completed`
    OrderInvalidStatus = 4006,

    InternalError = 9001,
    /// Key-value store unreachable or a command failed
    StoreError = 9002,
    /// A stored record could not be encoded or decoded
    SerializationError = 9003,
}

impl ErrorCode {
    /// Every code, in numeric order
    pub const ALL: [ErrorCode; 10] = [
        ErrorCode::InvalidFormat,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderAlreadyExists,
        ErrorCode::OrderAlreadyShipped,
        ErrorCode::OrderAlreadyCompleted,
        ErrorCode::OrderNotShipped,
        ErrorCode::OrderInvalidStatus,
        ErrorCode::InternalError,
        ErrorCode::StoreError,
        ErrorCode::SerializationError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default message used when no specific one is given
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyExists => "Order already exists",
            ErrorCode::OrderAlreadyShipped => "Order has already been shipped",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderNotShipped => "Order has not been shipped",
            ErrorCode::OrderInvalidStatus => "Order status is not recognized",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StoreError => "Store error",
            ErrorCode::SerializationError => "Serialization error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A u16 that names no [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_round_trips_through_u16() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_all_is_sorted_and_unique() {
        let values: Vec<u16> = ErrorCode::ALL.iter().map(|c| c.code()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unknown_u16_is_rejected() {
        assert_eq!(ErrorCode::try_from(9004), Err(InvalidErrorCode(9004)));
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(
            InvalidErrorCode(999).to_string(),
            "invalid error code: 999"
        );
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");

        let code: ErrorCode = serde_json::from_str("4005").unwrap();
        assert_eq!(code, ErrorCode::OrderNotShipped);

        assert!(serde_json::from_str::<ErrorCode>("4999").is_err());
    }
}
