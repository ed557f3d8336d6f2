pub mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::notification::Notification;
use crate::models::order::{Order, OrderReview, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Orders,
    Drivers,
    Notifications,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Orders => "orders",
            Collection::Drivers => "drivers",
            Collection::Notifications => "notifications",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: Uuid },

    #[error("{collection}/{id} changed concurrently: expected version {expected}, found {current}")]
    VersionConflict {
        collection: Collection,
        id: Uuid,
        expected: u64,
        current: u64,
    },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverAssignment {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub waybill_number: String,
    pub assigned_at: DateTime<Utc>,
}

// Setting `status` also rewrites `delivery_status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub assignment: Option<DriverAssignment>,
    pub detach_driver: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub review: Option<OrderReview>,
}

impl OrderPatch {
    pub fn apply(self, order: &mut Order) {
        if let Some(status) = self.status {
            order.set_status(status);
        }

        if self.detach_driver {
            order.driver_id = None;
            order.driver_name = None;
        }

        if let Some(assignment) = self.assignment {
            order.driver_id = Some(assignment.driver_id);
            order.driver_name = Some(assignment.driver_name);
            order.waybill_number = Some(assignment.waybill_number);
            order.assigned_at = Some(assignment.assigned_at);
        }

        if let Some(at) = self.delivered_at {
            order.delivered_at = Some(at);
        }
        if let Some(at) = self.completed_at {
            order.completed_at = Some(at);
        }
        if let Some(at) = self.cancelled_at {
            order.cancelled_at = Some(at);
        }
        if let Some(review) = self.review {
            order.review = Some(review);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverPatch {
    pub is_available: Option<bool>,
    /// Added to `completed_deliveries` inside the store, never read-modify-write.
    pub completed_deliveries_delta: u32,
}

impl DriverPatch {
    pub fn claim() -> Self {
        Self {
            is_available: Some(false),
            ..Self::default()
        }
    }

    pub fn release() -> Self {
        Self {
            is_available: Some(true),
            ..Self::default()
        }
    }

    pub fn complete_delivery() -> Self {
        Self {
            is_available: Some(true),
            completed_deliveries_delta: 1,
        }
    }

    pub fn apply(self, driver: &mut Driver, now: DateTime<Utc>) {
        if let Some(is_available) = self.is_available {
            driver.is_available = is_available;
        }
        driver.completed_deliveries = driver
            .completed_deliveries
            .saturating_add(self.completed_deliveries_delta);
        driver.updated_at = now;
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn get_order(&self, id: Uuid) -> Result<Order, StoreError>;

    async fn get_driver(&self, id: Uuid) -> Result<Driver, StoreError>;

    async fn query_orders_by_driver_and_status(
        &self,
        driver_id: Uuid,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, StoreError>;

    async fn query_drivers_by_availability(
        &self,
        is_available: bool,
    ) -> Result<Vec<Driver>, StoreError>;

    async fn conditional_update_order(
        &self,
        id: Uuid,
        expected_version: u64,
        patch: OrderPatch,
    ) -> Result<Order, StoreError>;

    async fn conditional_update_driver(
        &self,
        id: Uuid,
        expected_version: u64,
        patch: DriverPatch,
    ) -> Result<Driver, StoreError>;

    async fn update_driver(&self, id: Uuid, patch: DriverPatch) -> Result<Driver, StoreError>;

    async fn insert_notification(&self, notification: Notification) -> Result<Uuid, StoreError>;
}
