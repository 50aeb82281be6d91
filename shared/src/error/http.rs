//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::OrderNotFound => StatusCode::NOT_FOUND,

            Self::OrderAlreadyExists => StatusCode::CONFLICT,

            // Malformed input and refused status transitions
            Self::InvalidFormat
            | Self::OrderAlreadyShipped
            | Self::OrderAlreadyCompleted
            | Self::OrderNotShipped
            | Self::OrderInvalidStatus => StatusCode::BAD_REQUEST,

            Self::InternalError | Self::StoreError | Self::SerializationError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_code() {
        let expected = [
            (ErrorCode::InvalidFormat, StatusCode::BAD_REQUEST),
            (ErrorCode::OrderNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::OrderAlreadyExists, StatusCode::CONFLICT),
            (ErrorCode::OrderAlreadyShipped, StatusCode::BAD_REQUEST),
            (ErrorCode::OrderAlreadyCompleted, StatusCode::BAD_REQUEST),
            (ErrorCode::OrderNotShipped, StatusCode::BAD_REQUEST),
            (ErrorCode::OrderInvalidStatus, StatusCode::BAD_REQUEST),
            (ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::StoreError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::SerializationError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in expected {
            assert_eq!(code.http_status(), status, "{code:?}");
        }
    }

    #[test]
    fn test_system_codes_are_server_errors() {
        use crate::error::ErrorCategory;

        for code in ErrorCode::ALL {
            let is_system = code.category() == ErrorCategory::System;
            assert_eq!(code.http_status().is_server_error(), is_system, "{code:?}");
        }
    }
}
