//! Metrics for the token subsystem
//!
//! Prometheus naming conventions:
//! - `loft_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! - `status`: 2 values (success, error)
//! - `error_category`: 5 values (the four token error categories, or none)

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record token issuance duration and outcome
///
/// Metric: `loft_token_issuance_duration_seconds`, `loft_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str, duration: Duration) {
    histogram!("loft_token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("loft_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `loft_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("loft_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a signing secret rotation
///
/// Metric: `loft_key_rotation_total`
/// Labels: `status`
pub fn record_key_rotation(status: &str) {
    counter!("loft_key_rotation_total", "status" => status.to_string()).increment(1);
}

/// Record a failed write of the secret file
///
/// Metric: `loft_secret_persist_failures_total`
///
/// The process keeps running on the in-memory secret, but a restart will
/// rotate. Any non-zero rate deserves a look at disk health.
pub fn record_secret_persist_failure() {
    counter!("loft_secret_persist_failures_total").increment(1);
}

/// Update the number of secrets accepted for validation
///
/// Metric: `loft_active_signing_keys`
pub fn set_active_signing_keys(count: usize) {
    gauge!("loft_active_signing_keys").set(count as f64);
}
