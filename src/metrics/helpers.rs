//! Recording helpers for the metrics defined in the parent module

use prometheus::{Encoder, TextEncoder};

use super::{MUTATIONS_TOTAL, RECORDS_STORED, RENDERS_TOTAL};
use crate::resource::{Operation, Resource};
use crate::template::TemplateError;

/// Encode all registered metrics in the Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording render metrics
pub struct RenderMetrics;

impl RenderMetrics {
    pub fn record_rendered() {
        RENDERS_TOTAL.with_label_values(&["rendered"]).inc();
    }

    /// The render handler declined a request routed to it
    pub fn record_pass_through() {
        RENDERS_TOTAL.with_label_values(&["pass_through"]).inc();
    }

    pub fn record_failure(err: &TemplateError) {
        let outcome = match err {
            TemplateError::NotFound(_) => "not_found",
            TemplateError::Syntax { .. } => "syntax_error",
            TemplateError::InvalidVariables(_) => "invalid_variables",
            _ => "error",
        };
        RENDERS_TOTAL.with_label_values(&[outcome]).inc();
    }
}

/// Helper struct for recording record mutations
pub struct MutationMetrics;

impl MutationMetrics {
    /// Count a mutation if it succeeded
    pub fn record<T, E>(resource: Resource, operation: Operation, result: &Result<T, E>) {
        if result.is_ok() {
            MUTATIONS_TOTAL
                .with_label_values(&[resource.name(), operation.name()])
                .inc();
        }
    }

    /// Publish the live record count of a resource
    pub fn set_stored(resource: Resource, count: usize) {
        RECORDS_STORED
            .with_label_values(&[resource.name()])
            .set(count as i64);
    }
}
