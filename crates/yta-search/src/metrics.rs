//! Search metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Search requests by outcome (hit, miss, error, disabled).
    pub const REQUESTS_TOTAL: &str = "search_requests_total";

    /// Search latency in seconds.
    pub const LATENCY_SECONDS: &str = "search_latency_seconds";

    /// Source verifications by strategy and result.
    pub const VERIFICATIONS_TOTAL: &str = "source_verifications_total";
}

pub fn record_search(outcome: &str, latency_ms: f64) {
    counter!(names::REQUESTS_TOTAL, "outcome" => outcome.to_string()).increment(1);
    histogram!(names::LATENCY_SECONDS).record(latency_ms / 1000.0);
}

pub fn record_verification(strategy: &str, found: bool) {
    counter!(
        names::VERIFICATIONS_TOTAL,
        "strategy" => strategy.to_string(),
        "found" => if found { "true" } else { "false" }
    )
    .increment(1);
}
