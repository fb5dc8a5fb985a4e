//! Metric name constants and recording helpers

use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};

// Generation metric names
pub const GENERATION_REQUEST_COUNT: &str = "generation.request.count";
pub const GENERATION_REQUEST_DURATION: &str = "generation.request.duration";

/// Instrumentation scope for gateway metrics
const METER_NAME: &str = "mockup-gateway";

/// Record a duration measurement on a histogram
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[KeyValue]) {
    let duration = start.elapsed().as_secs_f64();
    histogram.record(duration, attributes);
}

/// Counters for generation requests, labelled by outcome
///
/// Instruments come from the global meter provider, so they are no-ops
/// until an OTLP exporter is installed.
#[derive(Clone)]
pub struct GenerationMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
}

impl GenerationMetrics {
    #[must_use]
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter(METER_NAME);

        Self {
            requests: meter
                .u64_counter(GENERATION_REQUEST_COUNT)
                .with_description("Generation requests by outcome")
                .build(),
            duration: meter
                .f64_histogram(GENERATION_REQUEST_DURATION)
                .with_description("Time spent serving a generation request")
                .with_unit("s")
                .build(),
        }
    }

    /// Record one finished request
    ///
    /// `outcome` is `success` or the failure kind.
    pub fn record(&self, outcome: &'static str, start: Instant) {
        let attributes = [KeyValue::new("outcome", outcome)];
        self.requests.add(1, &attributes);
        record_duration(&self.duration, start, &attributes);
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
