//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    MESSAGES_COMPOSED_TOTAL, PREVIEWS_RENDERED_TOTAL, SESSIONS_ACTIVE, SESSIONS_EXPIRED_TOTAL,
    SESSION_SWEEP_DURATION, TEMPLATES_TOTAL, TEMPLATE_SELECTIONS_TOTAL, VALIDATION_FAILURES_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for catalogue metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    pub fn set_total(count: usize) {
        TEMPLATES_TOTAL.set(count as i64);
    }
}

/// Helper struct for composer session metrics
pub struct SessionMetrics;

impl SessionMetrics {
    pub fn set_active(count: usize) {
        SESSIONS_ACTIVE.set(count as i64);
    }

    pub fn record_expired(count: usize) {
        SESSIONS_EXPIRED_TOTAL.inc_by(count as u64);
    }

    pub fn observe_sweep(elapsed: Duration) {
        SESSION_SWEEP_DURATION.observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for composer activity metrics
pub struct ComposerMetrics;

impl ComposerMetrics {
    pub fn record_selection() {
        TEMPLATE_SELECTIONS_TOTAL.inc();
    }

    pub fn record_preview() {
        PREVIEWS_RENDERED_TOTAL.inc();
    }

    /// Record a rejected submission by validation code
    pub fn record_validation_failure(code: &str) {
        VALIDATION_FAILURES_TOTAL.with_label_values(&[code]).inc();
    }

    /// Record a composed message by target kind
    pub fn record_composed(target: &str) {
        MESSAGES_COMPOSED_TOTAL.with_label_values(&[target]).inc();
    }
}
