//! Prometheus metrics for the component factory.
//!
//! All metrics follow the naming convention: `cf_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry for this process
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // FACTORY METRICS
    // =========================================================================

    /// Components produced by creators
    pub static ref COMPONENTS_CREATED: Counter = Counter::new(
        "cf_factory_components_created_total",
        "Total number of components created"
    ).expect("metric creation failed");

    /// Completed `configure()` calls
    pub static ref COMPONENTS_CONFIGURED: Counter = Counter::new(
        "cf_factory_components_configured_total",
        "Total number of components configured"
    ).expect("metric creation failed");

    /// Components destroyed by delete/clear/destroy calls
    pub static ref COMPONENTS_DESTROYED: Counter = Counter::new(
        "cf_factory_components_destroyed_total",
        "Total number of components destroyed"
    ).expect("metric creation failed");

    /// Components currently bound to a group
    pub static ref LIVE_COMPONENTS: Gauge = Gauge::new(
        "cf_factory_live_components",
        "Number of components currently bound to configuration groups"
    ).expect("metric creation failed");

    /// Cycles detected during resolution
    pub static ref CYCLIC_DEPENDENCIES: Counter = Counter::new(
        "cf_factory_cyclic_dependencies_total",
        "Total number of cyclic dependencies detected"
    ).expect("metric creation failed");

    /// Outermost resolve duration
    pub static ref RESOLVE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "cf_factory_resolve_duration_seconds",
            "Time spent in outermost resolve calls"
        ).buckets(exponential_buckets(0.00001, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // REGISTRY AND RESOURCE METRICS
    // =========================================================================

    /// Successful type registrations
    pub static ref TYPES_REGISTERED: Counter = Counter::new(
        "cf_registry_types_registered_total",
        "Total number of successful type registrations"
    ).expect("metric creation failed");

    /// Notifications delivered to subscribers
    pub static ref RESOURCE_NOTIFICATIONS: CounterVec = CounterVec::new(
        Opts::new("cf_resources_notifications_total", "Resource change notifications delivered"),
        &["change"]  // change: created/modified/declared_null/deleted
    ).expect("metric creation failed");
}

/// Register all metrics with [`REGISTRY`]. Calling it again is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(COMPONENTS_CREATED.clone()),
        Box::new(COMPONENTS_CONFIGURED.clone()),
        Box::new(COMPONENTS_DESTROYED.clone()),
        Box::new(LIVE_COMPONENTS.clone()),
        Box::new(CYCLIC_DEPENDENCIES.clone()),
        Box::new(RESOLVE_DURATION.clone()),
        Box::new(TYPES_REGISTERED.clone()),
        Box::new(RESOURCE_NOTIFICATIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
