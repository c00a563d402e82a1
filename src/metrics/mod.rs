//! Prometheus metrics for the composer service.
//!
//! - Catalogue metrics (templates loaded)
//! - Session metrics (open dialogs, idle expiry)
//! - Composer metrics (selections, previews, rejections, composed messages)

mod helpers;

pub use helpers::{encode_metrics, ComposerMetrics, SessionMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "wautopilot_composer";

lazy_static! {
    // ============================================================================
    // Catalogue Metrics
    // ============================================================================

    /// Templates currently in the catalogue
    pub static ref TEMPLATES_TOTAL: IntGauge = register_int_gauge!(
        format!("{}_templates_total", METRIC_PREFIX),
        "Number of templates in the catalogue"
    ).unwrap();

    // ============================================================================
    // Session Metrics
    // ============================================================================

    /// Open composer sessions
    pub static ref SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_sessions_active", METRIC_PREFIX),
        "Number of open composer sessions"
    ).unwrap();

    /// Sessions closed for inactivity
    pub static ref SESSIONS_EXPIRED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_sessions_expired_total", METRIC_PREFIX),
        "Total composer sessions closed for inactivity"
    ).unwrap();

    /// Duration of an idle-session sweep
    pub static ref SESSION_SWEEP_DURATION: Histogram = register_histogram!(
        format!("{}_session_sweep_duration_seconds", METRIC_PREFIX),
        "Time spent sweeping idle composer sessions",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
    ).unwrap();

    // ============================================================================
    // Composer Metrics
    // ============================================================================

    /// Template selections (binding allocations)
    pub static ref TEMPLATE_SELECTIONS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_selections_total", METRIC_PREFIX),
        "Total template selections"
    ).unwrap();

    /// Previews rendered
    pub static ref PREVIEWS_RENDERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_previews_rendered_total", METRIC_PREFIX),
        "Total template previews rendered"
    ).unwrap();

    /// Rejected submissions by validation code
    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_validation_failures_total", METRIC_PREFIX),
        "Total submissions rejected by validation",
        &["code"]
    ).unwrap();

    /// Messages composed by target kind
    pub static ref MESSAGES_COMPOSED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_composed_total", METRIC_PREFIX),
        "Total template messages composed",
        &["target"]
    ).unwrap();
}
