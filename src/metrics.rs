use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::time::Instant;

lazy_static! {
    // Process metrics
    pub static ref GATEWAY_UP: IntGauge = register_int_gauge!(
        "gateway_up",
        "Whether the gateway is up (1) or down (0)"
    ).unwrap();

    // Request metrics
    pub static ref QUERY_REQUESTS: IntCounter = register_int_counter!(
        "query_requests_total",
        "Total number of data queries received"
    ).unwrap();

    pub static ref DISCOVERY_REQUESTS: IntCounter = register_int_counter!(
        "discovery_requests_total",
        "Total number of metrics discovery requests received"
    ).unwrap();

    pub static ref REQUEST_DURATION: Histogram = register_histogram!(
        "request_duration_seconds",
        "Request duration in seconds",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    ).unwrap();

    // Store metrics
    pub static ref STORE_ERRORS: IntCounter = register_int_counter!(
        "store_errors_total",
        "Total number of failed store operations"
    ).unwrap();

    pub static ref ROWS_SKIPPED: IntCounter = register_int_counter!(
        "rows_skipped_total",
        "Rows dropped during columnar assembly for missing or mistyped fields"
    ).unwrap();
}

pub fn init_metrics() {
    GATEWAY_UP.set(1);
}

/// Observes the duration of one request on drop.
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for RequestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        REQUEST_DURATION.observe(duration);
    }
}

pub fn record_store_error() {
    STORE_ERRORS.inc();
}

pub fn record_skipped_row() {
    ROWS_SKIPPED.inc();
}
