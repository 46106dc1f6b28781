//! Pipeline metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Stage runs by stage and outcome (success, cached, error).
    pub const STAGE_RUNS_TOTAL: &str = "analysis_stage_runs_total";

    /// Stage duration in seconds, including verification and persistence.
    pub const STAGE_DURATION_SECONDS: &str = "analysis_stage_duration_seconds";

    /// Stage cache lookups by result (hit, miss, expired).
    pub const CACHE_LOOKUPS_TOTAL: &str = "analysis_cache_lookups_total";

    /// Links attached to cited sources, by section and whether search found them.
    pub const LINKS_VERIFIED_TOTAL: &str = "analysis_links_verified_total";
}

pub fn record_stage(stage: &str, outcome: &str, duration_ms: f64) {
    counter!(
        names::STAGE_RUNS_TOTAL,
        "stage" => stage.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage.to_string())
        .record(duration_ms / 1000.0);
}

pub fn record_cache(result: &'static str) {
    counter!(names::CACHE_LOOKUPS_TOTAL, "result" => result).increment(1);
}

pub fn record_link(section: &'static str, found: bool) {
    counter!(
        names::LINKS_VERIFIED_TOTAL,
        "section" => section,
        "found" => if found { "true" } else { "false" }
    )
    .increment(1);
}
