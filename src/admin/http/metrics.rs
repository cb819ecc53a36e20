//! Prometheus counters for the admin API.
//!
//! Without an installed recorder (tests, `--no-metrics`) these calls are
//! no-ops.

use metrics::counter;

/// Count one API operation on a resource (`images`, `projects`, `upload`).
pub fn record_operation(resource: &'static str, operation: &'static str) {
    counter!("folio_api_operations_total", "resource" => resource, "operation" => operation)
        .increment(1);
}

/// Count an error response by status class.
pub fn record_error(status: u16) {
    let class = match status {
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("folio_api_errors_total", "class" => class).increment(1);
}

/// Count bytes accepted by the upload endpoint.
pub fn record_upload_bytes(bytes: u64) {
    counter!("folio_upload_bytes_total").increment(bytes);
}
