use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub workflow_operations_total: IntCounterVec,
    pub workflow_latency_seconds: HistogramVec,
    pub best_effort_failures_total: IntCounterVec,
    pub eligible_drivers: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let workflow_operations_total = IntCounterVec::new(
            Opts::new(
                "workflow_operations_total",
                "Order workflow operations by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .expect("valid workflow_operations_total metric");

        let workflow_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "workflow_latency_seconds",
                "Latency of order workflow operations in seconds",
            ),
            &["operation"],
        )
        .expect("valid workflow_latency_seconds metric");

        let best_effort_failures_total = IntCounterVec::new(
            Opts::new(
                "best_effort_failures_total",
                "Failed follow-up writes that did not roll back a committed transition",
            ),
            &["step"],
        )
        .expect("valid best_effort_failures_total metric");

        let eligible_drivers = IntGauge::new(
            "eligible_drivers",
            "Drivers returned by the most recent eligibility listing",
        )
        .expect("valid eligible_drivers metric");

        registry
            .register(Box::new(workflow_operations_total.clone()))
            .expect("register workflow_operations_total");
        registry
            .register(Box::new(workflow_latency_seconds.clone()))
            .expect("register workflow_latency_seconds");
        registry
            .register(Box::new(best_effort_failures_total.clone()))
            .expect("register best_effort_failures_total");
        registry
            .register(Box::new(eligible_drivers.clone()))
            .expect("register eligible_drivers");

        Self {
            registry,
            workflow_operations_total,
            workflow_latency_seconds,
            best_effort_failures_total,
            eligible_drivers,
        }
    }

    pub fn observe(&self, operation: &str, outcome: &str, elapsed_seconds: f64) {
        self.workflow_operations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.workflow_latency_seconds
            .with_label_values(&[operation])
            .observe(elapsed_seconds);
    }

    pub fn best_effort_failed(&self, step: &str) {
        self.best_effort_failures_total
            .with_label_values(&[step])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
