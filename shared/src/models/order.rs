//! Order Model
//!
//! An order moves through `unshipped -> shipped -> completed`. The only way
//! to advance it is [`Order::apply`], which refuses out-of-order transitions
//! and leaves the order untouched when it does.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single purchased item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: Uuid,
    pub quantity: u32,
    /// Unit price in minor currency units
    pub price: u64,
}

/// Order entity as stored under `order:<id>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u64,
    pub customer_id: Uuid,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(
        order_id: u64,
        customer_id: Uuid,
        line_items: Vec<LineItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            customer_id,
            line_items,
            created_at,
            shipped_at: None,
            completed_at: None,
        }
    }

    /// Current lifecycle stage derived from the timestamps
    pub fn status(&self) -> OrderStatus {
        match (self.shipped_at, self.completed_at) {
            (_, Some(_)) => OrderStatus::Completed,
            (Some(_), None) => OrderStatus::Shipped,
            (None, None) => OrderStatus::Unshipped,
        }
    }

    /// Advance the order by one step, stamping the matching timestamp with `at`
    pub fn apply(
        &mut self,
        transition: StatusTransition,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        match (transition, self.status()) {
            (StatusTransition::Shipped, OrderStatus::Unshipped) => self.shipped_at = Some(at),
            (StatusTransition::Shipped, _) => return Err(TransitionError::AlreadyShipped),
            (StatusTransition::Completed, OrderStatus::Shipped) => self.completed_at = Some(at),
            (StatusTransition::Completed, OrderStatus::Completed) => {
                return Err(TransitionError::AlreadyCompleted);
            }
            (StatusTransition::Completed, OrderStatus::Unshipped) => {
                return Err(TransitionError::NotShipped);
            }
        }
        Ok(())
    }
}

/// Lifecycle stage of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Unshipped,
    Shipped,
    Completed,
}

/// A status change a client may request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Shipped,
    Completed,
}

impl StatusTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shipped => "shipped",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for StatusTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusTransition {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shipped" => Ok(Self::Shipped),
            "completed" => Ok(Self::Completed),
            other => Err(TransitionError::UnknownStatus(other.to_string())),
        }
    }
}

/// Why a requested status change was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("unknown status '{0}', expected 'shipped' or 'completed'")]
    UnknownStatus(String),

    #[error("order has already been shipped")]
    AlreadyShipped,

    #[error("order has already been completed")]
    AlreadyCompleted,

    #[error("order must be shipped before it can be completed")]
    NotShipped,
}

impl From<TransitionError> for crate::error::AppError {
    fn from(err: TransitionError) -> Self {
        use crate::error::{AppError, ErrorCode};

        let code = match &err {
            TransitionError::UnknownStatus(_) => ErrorCode::OrderInvalidStatus,
            TransitionError::AlreadyShipped => ErrorCode::OrderAlreadyShipped,
            TransitionError::AlreadyCompleted => ErrorCode::OrderAlreadyCompleted,
            TransitionError::NotShipped => ErrorCode::OrderNotShipped,
        };
        let app = AppError::with_message(code, err.to_string());
        match err {
            TransitionError::UnknownStatus(status) => app.with_detail("status", status),
            _ => app,
        }
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_id: Uuid,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Update order status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}

/// One page of the order listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPage {
    pub items: Vec<Order>,
    /// Cursor for the next page; 0 once iteration is complete
    pub next: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_order() -> Order {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Order::new(
            7,
            Uuid::new_v4(),
            vec![LineItem {
                item_id: Uuid::new_v4(),
                quantity: 2,
                price: 1250,
            }],
            created,
        )
    }

    #[test]
    fn test_new_order_is_unshipped() {
        let order = sample_order();
        assert_eq!(order.status(), OrderStatus::Unshipped);
        assert!(order.shipped_at.is_none());
        assert!(order.completed_at.is_none());
    }

    #[test]
    fn test_ship_then_complete() {
        let mut order = sample_order();
        let shipped = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let completed = Utc.with_ymd_and_hms(2024, 5, 3, 9, 0, 0).unwrap();

        order.apply(StatusTransition::Shipped, shipped).unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.shipped_at, Some(shipped));

        order.apply(StatusTransition::Completed, completed).unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
        assert_eq!(order.completed_at, Some(completed));
        assert_eq!(order.shipped_at, Some(shipped));
    }

    #[test]
    fn test_ship_twice_is_rejected_without_mutation() {
        let mut order = sample_order();
        let first = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        order.apply(StatusTransition::Shipped, first).unwrap();

        let err = order
            .apply(StatusTransition::Shipped, Utc::now())
            .unwrap_err();
        assert_eq!(err, TransitionError::AlreadyShipped);
        assert_eq!(order.shipped_at, Some(first));
    }

    #[test]
    fn test_complete_before_ship_is_rejected() {
        let mut order = sample_order();
        let before = order.clone();

        let err = order
            .apply(StatusTransition::Completed, Utc::now())
            .unwrap_err();
        assert_eq!(err, TransitionError::NotShipped);
        assert_eq!(order, before);
    }

    #[test]
    fn test_complete_twice_is_rejected() {
        let mut order = sample_order();
        order.apply(StatusTransition::Shipped, Utc::now()).unwrap();
        order.apply(StatusTransition::Completed, Utc::now()).unwrap();

        let err = order
            .apply(StatusTransition::Completed, Utc::now())
            .unwrap_err();
        assert_eq!(err, TransitionError::AlreadyCompleted);

        let err = order
            .apply(StatusTransition::Shipped, Utc::now())
            .unwrap_err();
        assert_eq!(err, TransitionError::AlreadyShipped);
    }

    #[test]
    fn test_parse_transition() {
        assert_eq!(
            "shipped".parse::<StatusTransition>(),
            Ok(StatusTransition::Shipped)
        );
        assert_eq!(
            "completed".parse::<StatusTransition>(),
            Ok(StatusTransition::Completed)
        );
        assert_eq!(
            "SHIPPED".parse::<StatusTransition>(),
            Err(TransitionError::UnknownStatus("SHIPPED".to_string()))
        );
        assert!("".parse::<StatusTransition>().is_err());
    }

    #[test]
    fn test_order_json_shape() {
        let order = sample_order();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["order_id"], 7);
        assert_eq!(json["line_items"][0]["quantity"], 2);
        assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
        assert!(json["shipped_at"].is_null());
        assert!(json["completed_at"].is_null());

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn test_transition_error_into_app_error() {
        use crate::error::{AppError, ErrorCode};
        use http::StatusCode;

        let err: AppError = TransitionError::UnknownStatus("lost".to_string()).into();
        assert_eq!(err.code, ErrorCode::OrderInvalidStatus);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details.unwrap().get("status").unwrap(), "lost");

        let err: AppError = TransitionError::NotShipped.into();
        assert_eq!(err.code, ErrorCode::OrderNotShipped);
        assert_eq!(err.message, "order must be shipped before it can be completed");

        let err: AppError = TransitionError::AlreadyCompleted.into();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_create_payload_defaults_line_items() {
        let payload: OrderCreate = serde_json::from_str(
            r#"{"customer_id":"6f1c2a9e-3b4d-4e5f-8a7b-1c2d3e4f5a6b"}"#,
        )
        .unwrap();
        assert!(payload.line_items.is_empty());
    }
}
