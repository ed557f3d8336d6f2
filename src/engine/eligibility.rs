use std::time::Instant;

use futures::future::try_join_all;
use tracing::debug;
use uuid::Uuid;

use crate::engine::OrderLifecycle;
use crate::error::AppError;
use crate::models::driver::{Driver, DriverSummary};
use crate::models::order::{Order, OrderStatus};
use crate::store::StoreError;

pub const ACTIVE_STATUSES: [OrderStatus; 2] = [OrderStatus::Processing, OrderStatus::Shipped];

impl OrderLifecycle {
    // Ordered by driver id; the availability flag alone is not trusted.
    pub async fn list_eligible_drivers(&self) -> Result<Vec<DriverSummary>, AppError> {
        let started = Instant::now();
        let result = self.eligible_drivers().await;
        self.record("list_eligible_drivers", started, &result);

        if let Ok(drivers) = &result {
            self.metrics
                .eligible_drivers
                .set(i64::try_from(drivers.len()).unwrap_or(i64::MAX));
        }

        result
    }

    async fn eligible_drivers(&self) -> Result<Vec<DriverSummary>, AppError> {
        let mut candidates = self.store.query_drivers_by_availability(true).await?;
        candidates.sort_by_key(|driver| driver.id);

        let active = try_join_all(
            candidates
                .iter()
                .map(|driver| self.active_orders(driver.id)),
        )
        .await?;

        let eligible = candidates
            .iter()
            .zip(active)
            .filter_map(|(driver, orders)| reconcile(driver, &orders))
            .collect();

        Ok(eligible)
    }

    pub(crate) async fn active_orders(&self, driver_id: Uuid) -> Result<Vec<Order>, StoreError> {
        self.store
            .query_orders_by_driver_and_status(driver_id, &ACTIVE_STATUSES)
            .await
    }
}

fn reconcile(driver: &Driver, active_orders: &[Order]) -> Option<DriverSummary> {
    match active_orders.first() {
        None => Some(DriverSummary::from(driver)),
        Some(order) => {
            debug!(
                driver_id = %driver.id,
                order_id = %order.id,
                "driver flagged available but has an active order"
            );
            None
        }
    }
}
