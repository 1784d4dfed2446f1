//! Prometheus metrics for the content service.
//!
//! - Render outcomes (rendered, passed through, failed by reason)
//! - Record mutations by resource and operation
//! - Stored record count by resource

mod helpers;

pub use helpers::{encode_metrics, MutationMetrics, RenderMetrics};

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, register_int_gauge_vec, IntCounterVec, IntGaugeVec};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "content";

lazy_static! {
    /// Render requests by outcome
    pub static ref RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_renders_total", METRIC_PREFIX),
        "Total render requests by outcome",
        &["outcome"]
    ).unwrap();

    /// Successful mutations by resource and operation
    pub static ref MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_mutations_total", METRIC_PREFIX),
        "Total record mutations by resource and operation",
        &["resource", "operation"]
    ).unwrap();

    /// Live records in storage by resource
    pub static ref RECORDS_STORED: IntGaugeVec = register_int_gauge_vec!(
        format!("{}_records_stored", METRIC_PREFIX),
        "Number of live records",
        &["resource"]
    ).unwrap();
}
