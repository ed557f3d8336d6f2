use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::order::OrderStatus;
use crate::store::{Collection, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("order {order_id} cannot move from {current} to {requested}")]
    IllegalTransition {
        order_id: Uuid,
        current: OrderStatus,
        requested: OrderStatus,
    },

    #[error("driver {driver_id} could not be assigned to order {order_id}: {reason}")]
    ConcurrentAssignmentConflict {
        order_id: Uuid,
        driver_id: Uuid,
        reason: String,
    },

    #[error("order {0} was modified concurrently; reload and retry")]
    ConcurrentModification(Uuid),

    #[error("notification for driver {driver_id} on order {order_id} was not delivered: {reason}")]
    NotificationDeliveryFailed {
        order_id: Uuid,
        driver_id: Uuid,
        reason: String,
    },

    #[error("driver {driver_id} was not updated after order {order_id}: {reason}")]
    DriverUpdateFailed {
        order_id: Uuid,
        driver_id: Uuid,
        reason: String,
    },

    #[error("order {0} has already been reviewed")]
    AlreadyReviewed(Uuid),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::IllegalTransition { .. } => "illegal_transition",
            AppError::ConcurrentAssignmentConflict { .. } => "concurrent_assignment_conflict",
            AppError::ConcurrentModification(_) => "concurrent_modification",
            AppError::NotificationDeliveryFailed { .. } => "notification_delivery_failed",
            AppError::DriverUpdateFailed { .. } => "driver_update_failed",
            AppError::AlreadyReviewed(_) => "already_reviewed",
            AppError::Validation(_) => "validation_error",
            AppError::Storage(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::ConcurrentAssignmentConflict { .. }
                | AppError::ConcurrentModification(_)
                | AppError::Storage(StoreError::Unavailable(_))
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => {
                let entity = match collection {
                    Collection::Orders => "order",
                    Collection::Drivers => "driver",
                    Collection::Notifications => "notification",
                };
                AppError::NotFound(format!("{entity} {id} not found"))
            }
            other => AppError::Storage(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IllegalTransition { .. }
            | AppError::ConcurrentAssignmentConflict { .. }
            | AppError::ConcurrentModification(_)
            | AppError::AlreadyReviewed(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotificationDeliveryFailed { .. }
            | AppError::DriverUpdateFailed { .. }
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "retryable": self.is_retryable(),
        }));

        (status, body).into_response()
    }
}
