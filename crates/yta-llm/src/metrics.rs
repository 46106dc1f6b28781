//! LLM call metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total model calls by model, label and outcome.
    pub const REQUESTS_TOTAL: &str = "llm_requests_total";

    /// Failed model calls by model, label and error kind.
    pub const FAILURES_TOTAL: &str = "llm_failures_total";

    /// Call latency in seconds by model and label.
    pub const LATENCY_SECONDS: &str = "llm_latency_seconds";

    /// Tokens consumed by model and direction.
    pub const TOKENS_TOTAL: &str = "llm_tokens_total";
}

/// Record a completed model call.
pub fn record_call(model: &str, label: &str, outcome: &str, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "model" => model.to_string(),
        "label" => label.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "model" => model.to_string(),
        "label" => label.to_string()
    )
    .record(latency_ms / 1000.0);
}

pub fn record_failure(model: &str, label: &str, kind: &str) {
    counter!(
        names::FAILURES_TOTAL,
        "model" => model.to_string(),
        "label" => label.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

pub fn record_tokens(model: &str, input_tokens: u64, output_tokens: u64) {
    counter!(names::TOKENS_TOTAL, "model" => model.to_string(), "direction" => "input")
        .increment(input_tokens);
    counter!(names::TOKENS_TOTAL, "model" => model.to_string(), "direction" => "output")
        .increment(output_tokens);
}
