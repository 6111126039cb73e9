use metrics::{counter, describe_counter};

/// Initialize counter descriptions
pub fn init() {
    describe_counter!(
        "piso_facade_calls_total",
        "Total number of token facade operations"
    );
    describe_counter!(
        "piso_facade_errors_total",
        "Total number of token facade operations that returned a fallback"
    );
    describe_counter!(
        "piso_backend_requests_total",
        "Total number of requests sent to the backend"
    );
}

/// Increment facade call counter
pub fn facade_call(operation: &'static str) {
    counter!("piso_facade_calls_total", "operation" => operation).increment(1);
}

/// Increment facade error counter
pub fn facade_error(operation: &'static str) {
    counter!("piso_facade_errors_total", "operation" => operation).increment(1);
}

/// Increment backend request counter (`kind` is "select", "rpc" or "auth")
pub fn backend_request(kind: &'static str) {
    counter!("piso_backend_requests_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_counters_carry_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            facade_call("transfer");
            facade_call("transfer");
            facade_error("transfer");
            backend_request("rpc");
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"piso_facade_calls_total{operation="transfer"} 2"#));
        assert!(rendered.contains(r#"piso_facade_errors_total{operation="transfer"} 1"#));
        assert!(rendered.contains(r#"piso_backend_requests_total{kind="rpc"} 1"#));
    }
}
