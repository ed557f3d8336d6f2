use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::Order;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderAssigned,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPayload {
    pub order_id: Uuid,
    pub amount: u64,
    pub delivery_address: String,
    pub seller_name: String,
    pub item_count: usize,
    pub total_units: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub order_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub payload: NotificationPayload,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn order_assigned(
        id: Uuid,
        driver_id: Uuid,
        order: &Order,
        created_at: DateTime<Utc>,
    ) -> Self {
        let payload = NotificationPayload {
            order_id: order.id,
            amount: order.totals().total_amount,
            delivery_address: order.delivery_address.clone(),
            seller_name: order.seller.name.clone(),
            item_count: order.items.len(),
            total_units: order.total_units(),
        };

        Self {
            id,
            driver_id,
            order_id: order.id,
            kind: NotificationKind::OrderAssigned,
            title: "New delivery assigned".to_string(),
            message: format!(
                "Pick up {} item(s) from {} for delivery to {}",
                payload.item_count, payload.seller_name, payload.delivery_address
            ),
            payload,
            is_read: false,
            created_at,
        }
    }
}
