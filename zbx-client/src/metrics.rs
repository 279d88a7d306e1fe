//! Client metrics definitions
//!
//! OpenTelemetry instruments recorded by the client when observability is
//! enabled through `ClientBuilder::with_observability()`.
//!
//! # Metrics Collected
//!
//! - **requests_total**: API calls sent, by method and status (counter)
//! - **request_duration**: API call latency in seconds (histogram)
//! - **errors_total**: failed calls, by error kind (counter)
//! - **resolutions_total**: name lookups, by kind and outcome (counter)

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    InstrumentationScope, KeyValue,
};

/// Client metrics for monitoring
pub struct ClientMetrics {
    /// Total number of API calls
    pub requests_total: Counter<u64>,
    /// API call duration in seconds
    pub request_duration: Histogram<f64>,
    /// Total number of failed calls
    pub errors_total: Counter<u64>,
    /// Total number of name lookups
    pub resolutions_total: Counter<u64>,
}

impl ClientMetrics {
    /// Create metrics on the global meter provider
    ///
    /// The meter is scoped by `service_name`, which is owned by the scope.
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into())
            .with_version(env!("CARGO_PKG_VERSION"))
            .build();
        let meter = global::meter_with_scope(scope);
        Self::new_with_meter(&meter)
    }

    /// Create metrics on a specific meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("zbx.client.requests.total")
                .with_description("Total number of API calls")
                .build(),
            request_duration: meter
                .f64_histogram("zbx.client.request.duration")
                .with_description("API call duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("zbx.client.errors.total")
                .with_description("Total number of failed API calls")
                .build(),
            resolutions_total: meter
                .u64_counter("zbx.client.resolutions.total")
                .with_description("Total number of name-to-id lookups")
                .build(),
        }
    }

    /// Record one API call
    pub fn record_request(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record a failed call by error kind
    pub fn record_error(&self, kind: &str) {
        self.errors_total
            .add(1, &[KeyValue::new("kind", kind.to_string())]);
    }

    /// Record a name lookup ("resolved", "passthrough", "not_found")
    pub fn record_resolution(&self, kind: &str, outcome: &str) {
        self.resolutions_total.add(
            1,
            &[
                KeyValue::new("kind", kind.to_string()),
                KeyValue::new("outcome", outcome.to_string()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_record_without_provider() {
        // The global no-op provider accepts every recording
        let metrics = ClientMetrics::new("test-client");
        metrics.record_request("host.get", "success", 0.12);
        metrics.record_error("transport");
        metrics.record_resolution("group", "resolved");
    }

    #[test]
    fn test_metrics_for_many_service_names() {
        for i in 0..3 {
            let metrics = ClientMetrics::new(format!("inventory-sync-{}", i));
            metrics.record_request("hostgroup.get", "success", 0.01);
        }
    }
}
