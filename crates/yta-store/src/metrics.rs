//! Store operation metrics.
//!
//! Every operation is labelled with the backend (`supabase` or `memory`) so
//! dashboards can tell a degraded in-memory deployment apart from the real one.

use std::future::Future;
use std::time::Instant;

use metrics::{counter, histogram};

use crate::error::{StoreError, StoreResult};

pub mod names {
    /// Operations by backend, operation and outcome (`ok` or an error kind).
    pub const OPERATIONS_TOTAL: &str = "yta_store_operations_total";

    /// Operation duration by backend and operation, retries included.
    pub const OPERATION_DURATION_SECONDS: &str = "yta_store_operation_duration_seconds";

    /// Retried attempts by operation and the error kind that caused them.
    pub const RETRIES_TOTAL: &str = "yta_store_retries_total";
}

/// Outcome label for a finished operation.
pub fn outcome<T>(result: &StoreResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    }
}

/// Run one store operation and record its outcome and duration.
pub async fn observe<T, F>(backend: &'static str, operation: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let start = Instant::now();
    let result = fut.await;

    counter!(
        names::OPERATIONS_TOTAL,
        "backend" => backend,
        "operation" => operation,
        "outcome" => outcome(&result)
    )
    .increment(1);
    histogram!(
        names::OPERATION_DURATION_SECONDS,
        "backend" => backend,
        "operation" => operation
    )
    .record(start.elapsed().as_secs_f64());

    result
}

/// Record a retried Supabase attempt.
pub fn record_retry(operation: &str, error: &StoreError) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string(),
        "reason" => error.kind()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome(&Ok::<_, StoreError>(())), "ok");
        assert_eq!(outcome::<()>(&Err(StoreError::RateLimited(1000))), "rate_limited");
        assert_eq!(
            outcome::<()>(&Err(StoreError::from_http_status(503, "down"))),
            "server_error"
        );
    }

    #[tokio::test]
    async fn test_observe_passes_result_through() {
        let value = observe("memory", "count", async { Ok(3u64) }).await.unwrap();
        assert_eq!(value, 3);

        let err = observe::<(), _>("supabase", "get", async {
            Err(StoreError::not_configured("missing key"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured(_)));
    }
}
