use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn delivery_status(self) -> DeliveryStatus {
        match self {
            OrderStatus::Pending => DeliveryStatus::Pending,
            OrderStatus::Processing => DeliveryStatus::Processing,
            OrderStatus::Shipped => DeliveryStatus::Shipped,
            OrderStatus::Completed => DeliveryStatus::Delivered,
            OrderStatus::Cancelled => DeliveryStatus::Cancelled,
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }

    /// Orders in these states occupy their driver.
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Shipped)
    }

    pub fn requires_driver(self) -> bool {
        matches!(
            self,
            OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Completed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartyRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    /// Minor currency units (kobo).
    pub unit_price: u64,
    pub unit: String,
}

impl LineItem {
    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderTotals {
    pub items_total: u64,
    pub delivery_fee: u64,
    pub total_amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderReview {
    pub product_rating: u8,
    pub product_feedback: String,
    pub logistics_rating: u8,
    pub logistics_feedback: String,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub buyer: PartyRef,
    pub seller: PartyRef,
    pub items: Vec<LineItem>,
    pub delivery_fee: u64,
    pub delivery_address: String,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub waybill_number: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review: Option<OrderReview>,
    #[serde(default)]
    pub version: u64,
}

impl Order {
    pub fn new_paid(
        id: Uuid,
        buyer: PartyRef,
        seller: PartyRef,
        items: Vec<LineItem>,
        delivery_fee: u64,
        delivery_address: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            buyer,
            seller,
            items,
            delivery_fee,
            delivery_address: delivery_address.into(),
            payment_status: PaymentStatus::Paid,
            status: OrderStatus::Pending,
            delivery_status: DeliveryStatus::Pending,
            driver_id: None,
            driver_name: None,
            waybill_number: None,
            created_at,
            assigned_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            review: None,
            version: 0,
        }
    }

    /// Keeps `delivery_status` in lockstep with `status`.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.delivery_status = status.delivery_status();
    }

    pub fn totals(&self) -> OrderTotals {
        let items_total = self
            .items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.subtotal()));

        OrderTotals {
            items_total,
            delivery_fee: self.delivery_fee,
            total_amount: items_total.saturating_add(self.delivery_fee),
        }
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn is_reviewed(&self) -> bool {
        self.review.is_some()
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        if self.delivery_status != self.status.delivery_status() {
            return Err(format!(
                "order {} has delivery status {:?} but status {}",
                self.id, self.delivery_status, self.status
            ));
        }

        if self.status.requires_driver() != self.driver_id.is_some() {
            return Err(format!(
                "order {} is {} but driver assignment is {:?}",
                self.id, self.status, self.driver_id
            ));
        }

        if self.review.is_some() && self.status != OrderStatus::Completed {
            return Err(format!(
                "order {} carries a review while {}",
                self.id, self.status
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn order() -> Order {
        Order::new_paid(
            Uuid::from_u128(1),
            PartyRef {
                id: "buyer-1".to_string(),
                name: "Ngozi Okafor".to_string(),
            },
            PartyRef {
                id: "farmer-1".to_string(),
                name: "Aminu Hassan".to_string(),
            },
            vec![
                LineItem {
                    product_id: "tomatoes".to_string(),
                    product_name: "Fresh Tomatoes".to_string(),
                    quantity: 10,
                    unit_price: 2_000,
                    unit: "kg".to_string(),
                },
                LineItem {
                    product_id: "onions".to_string(),
                    product_name: "Onions".to_string(),
                    quantity: 5,
                    unit_price: 1_500,
                    unit: "kg".to_string(),
                },
            ],
            1_000,
            "12 Ahmadu Bello Way, Kaduna",
            Utc::now(),
        )
    }

    #[test]
    fn delivery_status_follows_status() {
        let mut order = order();
        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Completed,
        ] {
            order.set_status(status);
            assert_eq!(order.delivery_status, status.delivery_status());
        }
        assert_eq!(order.delivery_status, DeliveryStatus::Delivered);
    }

    #[test]
    fn only_forward_transitions_and_pending_cancellation_are_legal() {
        use OrderStatus::*;

        let all = [Pending, Processing, Shipped, Completed, Cancelled];
        let legal = [
            (Pending, Processing),
            (Processing, Shipped),
            (Shipped, Completed),
            (Pending, Cancelled),
        ];

        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn totals_are_recomputed_from_line_items() {
        let totals = order().totals();
        assert_eq!(totals.items_total, 27_500);
        assert_eq!(totals.delivery_fee, 1_000);
        assert_eq!(totals.total_amount, 28_500);
    }

    #[test]
    fn total_units_sums_quantities() {
        assert_eq!(order().total_units(), 15);
    }

    #[test]
    fn processing_order_without_driver_violates_invariants() {
        let mut order = order();
        order.set_status(OrderStatus::Processing);
        assert!(order.check_invariants().is_err());

        order.driver_id = Some(Uuid::from_u128(7));
        assert!(order.check_invariants().is_ok());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let json = serde_json::to_string(&DeliveryStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
    }
}
