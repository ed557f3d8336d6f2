use std::sync::Arc;

use crate::engine::OrderLifecycle;
use crate::observability::metrics::Metrics;
use crate::store::memory::MemoryStore;

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub lifecycle: OrderLifecycle,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let metrics = Metrics::new();
        let lifecycle = OrderLifecycle::new(store.clone(), metrics.clone());

        Self {
            store,
            lifecycle,
            metrics,
        }
    }
}
