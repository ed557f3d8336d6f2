use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::{OrderLifecycle, WorkflowOutcome};
use crate::error::AppError;
use crate::models::driver::Driver;
use crate::models::notification::Notification;
use crate::models::order::{Order, OrderStatus};
use crate::store::{DriverAssignment, DriverPatch, OrderPatch, StoreError};

impl OrderLifecycle {
    // Claims the driver before the order so a lost race on either leaves nothing changed.
    pub async fn assign_driver(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
    ) -> Result<WorkflowOutcome, AppError> {
        let started = Instant::now();
        let result = self.try_assign(order_id, driver_id).await;
        self.record("assign_driver", started, &result);
        result
    }

    async fn try_assign(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
    ) -> Result<WorkflowOutcome, AppError> {
        let order = self.store.get_order(order_id).await?;
        if !order.status.can_transition_to(OrderStatus::Processing) {
            return Err(AppError::IllegalTransition {
                order_id,
                current: order.status,
                requested: OrderStatus::Processing,
            });
        }

        let driver = self.store.get_driver(driver_id).await?;
        self.ensure_eligible(&order, &driver).await?;

        let claimed = self
            .store
            .conditional_update_driver(driver.id, driver.version, DriverPatch::claim())
            .await
            .map_err(|err| {
                assignment_conflict(err, order_id, driver_id, "driver was claimed concurrently")
            })?;

        let now = self.clock.now();
        let patch = OrderPatch {
            status: Some(OrderStatus::Processing),
            assignment: Some(DriverAssignment {
                driver_id,
                driver_name: driver.name.clone(),
                waybill_number: waybill_number(now),
                assigned_at: now,
            }),
            ..OrderPatch::default()
        };

        let assigned = match self
            .store
            .conditional_update_order(order.id, order.version, patch)
            .await
        {
            Ok(assigned) => assigned,
            Err(err) => {
                self.release_claim(order_id, &claimed).await;
                return Err(assignment_conflict(
                    err,
                    order_id,
                    driver_id,
                    "order was changed concurrently",
                ));
            }
        };

        info!(
            order_id = %order_id,
            driver_id = %driver_id,
            waybill = assigned.waybill_number.as_deref().unwrap_or_default(),
            "driver assigned"
        );

        let mut outcome = WorkflowOutcome::committed(assigned);
        let notification = Notification::order_assigned(Uuid::new_v4(), driver_id, &outcome.order, now);

        match self.store.insert_notification(notification).await {
            Ok(id) => outcome.notification_id = Some(id),
            Err(err) => {
                warn!(order_id = %order_id, driver_id = %driver_id, error = %err, "assignment notification failed");
                self.metrics.best_effort_failed("notification");
                outcome.warnings.push(AppError::NotificationDeliveryFailed {
                    order_id,
                    driver_id,
                    reason: err.to_string(),
                });
            }
        }

        Ok(outcome)
    }

    async fn ensure_eligible(&self, order: &Order, driver: &Driver) -> Result<(), AppError> {
        if !driver.is_available {
            return Err(AppError::ConcurrentAssignmentConflict {
                order_id: order.id,
                driver_id: driver.id,
                reason: "driver is no longer available".to_string(),
            });
        }

        let active = self.active_orders(driver.id).await?;
        if let Some(busy) = active.first() {
            return Err(AppError::ConcurrentAssignmentConflict {
                order_id: order.id,
                driver_id: driver.id,
                reason: format!("driver is already on order {}", busy.id),
            });
        }

        Ok(())
    }

    async fn release_claim(&self, order_id: Uuid, claimed: &Driver) {
        if let Err(err) = self
            .store
            .conditional_update_driver(claimed.id, claimed.version, DriverPatch::release())
            .await
        {
            error!(
                order_id = %order_id,
                driver_id = %claimed.id,
                error = %err,
                "failed to release driver after losing assignment race"
            );
            self.metrics.best_effort_failed("driver_release");
        }
    }
}

fn assignment_conflict(err: StoreError, order_id: Uuid, driver_id: Uuid, reason: &str) -> AppError {
    match err {
        StoreError::VersionConflict { .. } => AppError::ConcurrentAssignmentConflict {
            order_id,
            driver_id,
            reason: reason.to_string(),
        },
        other => other.into(),
    }
}

pub fn waybill_number(at: DateTime<Utc>) -> String {
    format!("WB-{}", at.timestamp_millis())
}
