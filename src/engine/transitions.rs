use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{OrderLifecycle, WorkflowOutcome};
use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::store::{DriverPatch, OrderPatch, StoreError};

impl OrderLifecycle {
    pub async fn advance_status(
        &self,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<WorkflowOutcome, AppError> {
        let started = Instant::now();
        let result = self.try_advance(order_id, target).await;
        self.record("advance_status", started, &result);
        result
    }

    async fn try_advance(
        &self,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<WorkflowOutcome, AppError> {
        let order = self.store.get_order(order_id).await?;
        let now = self.clock.now();

        let patch = transition_patch(&order, target, now)
            .filter(|_| order.status.can_transition_to(target))
            .ok_or(AppError::IllegalTransition {
                order_id,
                current: order.status,
                requested: target,
            })?;

        let updated = self
            .store
            .conditional_update_order(order.id, order.version, patch)
            .await
            .map_err(|err| match err {
                StoreError::VersionConflict { .. } => AppError::ConcurrentModification(order_id),
                other => other.into(),
            })?;

        info!(
            order_id = %order_id,
            from = %order.status,
            to = %target,
            "order status advanced"
        );

        let mut outcome = WorkflowOutcome::committed(updated);

        match (target, order.driver_id) {
            (OrderStatus::Completed, Some(driver_id)) => {
                self.update_driver_after(&mut outcome, driver_id, DriverPatch::complete_delivery())
                    .await;
            }
            (OrderStatus::Completed, None) => {
                warn!(order_id = %order_id, "completed order had no driver attached");
            }
            (OrderStatus::Cancelled, Some(driver_id)) => {
                warn!(
                    order_id = %order_id,
                    driver_id = %driver_id,
                    "cancelled order still had a driver attached; releasing driver"
                );
                self.update_driver_after(&mut outcome, driver_id, DriverPatch::release())
                    .await;
            }
            _ => {}
        }

        Ok(outcome)
    }

    async fn update_driver_after(
        &self,
        outcome: &mut WorkflowOutcome,
        driver_id: Uuid,
        patch: DriverPatch,
    ) {
        if let Err(err) = self.store.update_driver(driver_id, patch).await {
            warn!(
                order_id = %outcome.order.id,
                driver_id = %driver_id,
                error = %err,
                "driver update after status change failed"
            );
            self.metrics.best_effort_failed("driver_update");
            outcome.warnings.push(AppError::DriverUpdateFailed {
                order_id: outcome.order.id,
                driver_id,
                reason: err.to_string(),
            });
        }
    }
}

fn transition_patch(order: &Order, target: OrderStatus, now: DateTime<Utc>) -> Option<OrderPatch> {
    let patch = match target {
        OrderStatus::Shipped => OrderPatch {
            status: Some(OrderStatus::Shipped),
            ..OrderPatch::default()
        },
        OrderStatus::Completed => OrderPatch {
            status: Some(OrderStatus::Completed),
            delivered_at: Some(now),
            completed_at: Some(now),
            ..OrderPatch::default()
        },
        OrderStatus::Cancelled => OrderPatch {
            status: Some(OrderStatus::Cancelled),
            detach_driver: order.driver_id.is_some(),
            cancelled_at: Some(now),
            ..OrderPatch::default()
        },
        OrderStatus::Pending | OrderStatus::Processing => return None,
    };

    Some(patch)
}
