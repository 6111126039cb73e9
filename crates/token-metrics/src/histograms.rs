use metrics::{describe_histogram, histogram};
use std::time::Duration;

/// Initialize histogram descriptions
pub fn init() {
    describe_histogram!(
        "piso_backend_request_duration_seconds",
        "Time for backend requests"
    );
}

/// Record backend request duration
pub fn backend_request_duration(duration: Duration, kind: &'static str) {
    histogram!("piso_backend_request_duration_seconds", "kind" => kind)
        .record(duration.as_secs_f64());
}
