pub mod assignment;
pub mod clock;
pub mod eligibility;
pub mod review;
pub mod transitions;

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::engine::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::models::driver::Driver;
use crate::models::order::Order;
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

#[derive(Debug)]
pub struct WorkflowOutcome {
    pub order: Order,
    pub notification_id: Option<Uuid>,
    pub warnings: Vec<AppError>,
}

impl WorkflowOutcome {
    fn committed(order: Order) -> Self {
        Self {
            order,
            notification_id: None,
            warnings: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct OrderLifecycle {
    store: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl OrderLifecycle {
    pub fn new(store: Arc<dyn OrderStore>, metrics: Metrics) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            metrics,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, AppError> {
        Ok(self.store.get_order(id).await?)
    }

    pub async fn get_driver(&self, id: Uuid) -> Result<Driver, AppError> {
        Ok(self.store.get_driver(id).await?)
    }

    fn record<T>(&self, operation: &str, started: Instant, result: &Result<T, AppError>) {
        let outcome = match result {
            Ok(_) => "success",
            Err(err) => err.kind(),
        };
        self.metrics
            .observe(operation, outcome, started.elapsed().as_secs_f64());
    }
}
