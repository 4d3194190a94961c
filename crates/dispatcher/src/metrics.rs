//! Per-(layer, action) dispatch counters and latency histogram. Exposed via
//! a public [`prometheus::Registry`] so a host binary can wire an endpoint.

use lazy_static::lazy_static;
use prometheus::{HistogramVec, IntCounterVec, Opts, Registry};

lazy_static! {
    pub static ref DISPATCH_REGISTRY: Registry = Registry::new();
    pub static ref DISPATCH_TOTAL: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new("uia_dispatch_total", "Commands dispatched"),
            &["layer", "action", "status"],
        )
        .expect("metric options are valid");
        DISPATCH_REGISTRY
            .register(Box::new(counter.clone()))
            .expect("first registration of uia_dispatch_total");
        counter
    };
    pub static ref DISPATCH_LATENCY: HistogramVec = {
        let histogram = HistogramVec::new(
            prometheus::HistogramOpts::new("uia_dispatch_latency_seconds", "Dispatch latency"),
            &["layer", "action"],
        )
        .expect("metric options are valid");
        DISPATCH_REGISTRY
            .register(Box::new(histogram.clone()))
            .expect("first registration of uia_dispatch_latency_seconds");
        histogram
    };
}

pub fn observe(layer: &str, action: &str, status: &str, elapsed_secs: f64) {
    DISPATCH_TOTAL.with_label_values(&[layer, action, status]).inc();
    DISPATCH_LATENCY.with_label_values(&[layer, action]).observe(elapsed_secs);
}
