use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::notification::Notification;
use crate::models::order::{Order, OrderStatus};
use crate::store::{Collection, DriverPatch, OrderPatch, OrderStore, StoreError};

#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Default)]
pub struct MemoryStore {
    orders: DashMap<Uuid, Order>,
    drivers: DashMap<Uuid, Driver>,
    notifications: DashMap<Uuid, Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Result<Self, StoreError> {
        let store = Self::new();
        let mut active_by_driver: HashMap<Uuid, Uuid> = HashMap::new();

        for driver in seed.drivers {
            store.insert_driver(driver);
        }

        for order in seed.orders {
            order.check_invariants().map_err(StoreError::InvalidDocument)?;
            if let Some(driver_id) = order.driver_id {
                if !store.drivers.contains_key(&driver_id) {
                    return Err(StoreError::InvalidDocument(format!(
                        "order {} references unknown driver {driver_id}",
                        order.id
                    )));
                }
                if order.status.is_active() {
                    if let Some(other) = active_by_driver.insert(driver_id, order.id) {
                        return Err(StoreError::InvalidDocument(format!(
                            "driver {driver_id} is active on both order {other} and order {}",
                            order.id
                        )));
                    }
                }
            }
            store.insert_order(order);
        }

        Ok(store)
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let seed: Seed = serde_json::from_str(raw)
            .map_err(|err| StoreError::InvalidDocument(format!("seed is not valid json: {err}")))?;
        Self::from_seed(seed)
    }

    pub fn insert_order(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn insert_driver(&self, driver: Driver) {
        self.drivers.insert(driver.id, driver);
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    pub fn notifications_for_driver(&self, driver_id: Uuid) -> Vec<Notification> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|entry| entry.value().driver_id == driver_id)
            .map(|entry| entry.value().clone())
            .collect();
        notifications.sort_by_key(|notification| notification.created_at);
        notifications
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn get_order(&self, id: Uuid) -> Result<Order, StoreError> {
        self.orders
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound {
                collection: Collection::Orders,
                id,
            })
    }

    async fn get_driver(&self, id: Uuid) -> Result<Driver, StoreError> {
        self.drivers
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound {
                collection: Collection::Drivers,
                id,
            })
    }

    async fn query_orders_by_driver_and_status(
        &self,
        driver_id: Uuid,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.driver_id == Some(driver_id) && statuses.contains(&order.status)
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn query_drivers_by_availability(
        &self,
        is_available: bool,
    ) -> Result<Vec<Driver>, StoreError> {
        Ok(self
            .drivers
            .iter()
            .filter(|entry| entry.value().is_available == is_available)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn conditional_update_order(
        &self,
        id: Uuid,
        expected_version: u64,
        patch: OrderPatch,
    ) -> Result<Order, StoreError> {
        let mut order = self.orders.get_mut(&id).ok_or(StoreError::NotFound {
            collection: Collection::Orders,
            id,
        })?;

        if order.version != expected_version {
            return Err(StoreError::VersionConflict {
                collection: Collection::Orders,
                id,
                expected: expected_version,
                current: order.version,
            });
        }

        patch.apply(&mut order);
        order.version += 1;

        Ok(order.clone())
    }

    async fn conditional_update_driver(
        &self,
        id: Uuid,
        expected_version: u64,
        patch: DriverPatch,
    ) -> Result<Driver, StoreError> {
        let mut driver = self.drivers.get_mut(&id).ok_or(StoreError::NotFound {
            collection: Collection::Drivers,
            id,
        })?;

        if driver.version != expected_version {
            return Err(StoreError::VersionConflict {
                collection: Collection::Drivers,
                id,
                expected: expected_version,
                current: driver.version,
            });
        }

        patch.apply(&mut driver, Utc::now());
        driver.version += 1;

        Ok(driver.clone())
    }

    async fn update_driver(&self, id: Uuid, patch: DriverPatch) -> Result<Driver, StoreError> {
        let mut driver = self.drivers.get_mut(&id).ok_or(StoreError::NotFound {
            collection: Collection::Drivers,
            id,
        })?;

        patch.apply(&mut driver, Utc::now());
        driver.version += 1;

        Ok(driver.clone())
    }

    async fn insert_notification(&self, notification: Notification) -> Result<Uuid, StoreError> {
        let id = notification.id;
        self.notifications.insert(id, notification);
        Ok(id)
    }
}
