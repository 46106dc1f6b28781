//! In-memory analysis store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use yta_models::{AnalysisPatch, AnalysisRecord, HistoryItem, NewAnalysis};

use crate::error::StoreResult;
use crate::metrics::observe;
use crate::AnalysisStore;

const BACKEND: &str = "memory";

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    // insertion order; newest last
    rows: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully formed record as-is.
    pub async fn seed(&self, record: AnalysisRecord) {
        self.rows.write().await.push(record);
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn insert(&self, new: NewAnalysis) -> StoreResult<AnalysisRecord> {
        observe(BACKEND, "insert", async {
            let record = AnalysisRecord::from_new(uuid::Uuid::new_v4().to_string(), new, Utc::now());
            self.rows.write().await.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<AnalysisRecord>> {
        observe(BACKEND, "get", async {
            Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
        })
        .await
    }

    async fn find_by_video_id(&self, video_id: &str) -> StoreResult<Option<AnalysisRecord>> {
        observe(BACKEND, "find_by_video_id", async {
            Ok(self
                .rows
                .read()
                .await
                .iter()
                .filter(|r| r.video_id == video_id)
                .max_by_key(|r| r.created_at)
                .cloned())
        })
        .await
    }

    async fn update(&self, id: &str, patch: AnalysisPatch) -> StoreResult<Option<AnalysisRecord>> {
        observe(BACKEND, "update", async {
            let mut rows = self.rows.write().await;
            Ok(rows.iter_mut().find(|r| r.id == id).map(|record| {
                record.apply(patch);
                record.clone()
            }))
        })
        .await
    }

    async fn history(&self, limit: u32, offset: u32) -> StoreResult<Vec<HistoryItem>> {
        observe(BACKEND, "history", async {
            let rows = self.rows.read().await;
            let mut items: Vec<HistoryItem> = rows.iter().map(HistoryItem::from).collect();
            // stable sort keeps later inserts first among equal timestamps
            items.reverse();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(items
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        })
        .await
    }

    async fn count(&self) -> StoreResult<u64> {
        observe(BACKEND, "count", async { Ok(self.rows.read().await.len() as u64) }).await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        observe(BACKEND, "delete", async {
            let mut rows = self.rows.write().await;
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok(rows.len() != before)
        })
        .await
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
