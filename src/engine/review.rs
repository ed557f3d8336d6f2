use std::time::Instant;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::engine::OrderLifecycle;
use crate::error::AppError;
use crate::models::order::{Order, OrderReview, OrderStatus};
use crate::store::{OrderPatch, StoreError};

const MAX_FEEDBACK_CHARS: usize = 2_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSubmission {
    pub product_rating: i64,
    #[serde(default)]
    pub product_feedback: String,
    pub logistics_rating: i64,
    #[serde(default)]
    pub logistics_feedback: String,
}

impl OrderLifecycle {
    pub async fn record_review(
        &self,
        order_id: Uuid,
        submission: ReviewSubmission,
    ) -> Result<Order, AppError> {
        let started = Instant::now();
        let result = self.try_review(order_id, submission).await;
        self.record("record_review", started, &result);
        result
    }

    async fn try_review(
        &self,
        order_id: Uuid,
        submission: ReviewSubmission,
    ) -> Result<Order, AppError> {
        let product_rating = rating("product_rating", submission.product_rating)?;
        let logistics_rating = rating("logistics_rating", submission.logistics_rating)?;
        let product_feedback = feedback("product_feedback", &submission.product_feedback)?;
        let logistics_feedback = feedback("logistics_feedback", &submission.logistics_feedback)?;

        let order = self.store.get_order(order_id).await?;
        if order.is_reviewed() {
            return Err(AppError::AlreadyReviewed(order_id));
        }
        if order.status != OrderStatus::Completed {
            return Err(AppError::Validation(format!(
                "order {order_id} is {}; only completed orders can be reviewed",
                order.status
            )));
        }

        let patch = OrderPatch {
            review: Some(OrderReview {
                product_rating,
                product_feedback,
                logistics_rating,
                logistics_feedback,
                reviewed_at: self.clock.now(),
            }),
            ..OrderPatch::default()
        };

        let reviewed = match self
            .store
            .conditional_update_order(order.id, order.version, patch)
            .await
        {
            Ok(reviewed) => reviewed,
            Err(StoreError::VersionConflict { .. }) => {
                let current = self.store.get_order(order_id).await?;
                return Err(if current.is_reviewed() {
                    AppError::AlreadyReviewed(order_id)
                } else {
                    AppError::ConcurrentModification(order_id)
                });
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            order_id = %order_id,
            product_rating,
            logistics_rating,
            "order reviewed"
        );

        Ok(reviewed)
    }
}

fn rating(field: &str, value: i64) -> Result<u8, AppError> {
    u8::try_from(value)
        .ok()
        .filter(|rating| (1..=5).contains(rating))
        .ok_or_else(|| AppError::Validation(format!("{field} must be between 1 and 5, got {value}")))
}

fn feedback(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > MAX_FEEDBACK_CHARS {
        return Err(AppError::Validation(format!(
            "{field} must be at most {MAX_FEEDBACK_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
