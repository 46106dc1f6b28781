//! Analysis record persistence.
//!
//! This crate provides:
//! - The [`AnalysisStore`] trait used by the pipeline
//! - [`SupabaseStore`], a PostgREST client with retry and metrics
//! - [`MemoryStore`], a process-local store for development and tests

pub mod config;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod retry;
pub mod supabase;

use async_trait::async_trait;
use yta_models::{AnalysisPatch, AnalysisRecord, HistoryItem, NewAnalysis};

pub use config::SupabaseConfig;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use retry::RetryConfig;
pub use supabase::SupabaseStore;

/// Storage for analysis records.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Insert a new analysis and return the stored row.
    async fn insert(&self, new: NewAnalysis) -> StoreResult<AnalysisRecord>;

    async fn get(&self, id: &str) -> StoreResult<Option<AnalysisRecord>>;

    /// Most recent analysis for a video.
    async fn find_by_video_id(&self, video_id: &str) -> StoreResult<Option<AnalysisRecord>>;

    /// Apply a partial update. `Ok(None)` when the row does not exist.
    async fn update(&self, id: &str, patch: AnalysisPatch) -> StoreResult<Option<AnalysisRecord>>;

    /// History rows, newest first.
    async fn history(&self, limit: u32, offset: u32) -> StoreResult<Vec<HistoryItem>>;

    async fn count(&self) -> StoreResult<u64>;

    /// Delete a row. Returns whether anything was deleted.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}
