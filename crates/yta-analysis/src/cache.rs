//! Volatile per-video cache of stage results.
//!
//! Layout is `video_id -> stage key -> (result, inserted_at)`. Entries expire
//! after the configured TTL and the oldest videos are evicted once the video
//! count exceeds capacity. Nothing survives a restart.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use yta_models::{AdditionalAnalysis, AnalysisRecord, CriticalAnalysis};

use crate::metrics;

/// Which stage a cached result belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StageKey {
    Video,
    Critical(String),
    Additional,
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKey::Video => f.write_str("stage1"),
            StageKey::Critical(perspective) => write!(f, "stage2:{}", perspective),
            StageKey::Additional => f.write_str("stage3"),
        }
    }
}

/// A cached stage result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedStage {
    Video(Box<AnalysisRecord>),
    Critical(Box<CriticalAnalysis>),
    Additional(Box<AdditionalAnalysis>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub video_ids: Vec<String>,
}

struct VideoEntry {
    created_at: Instant,
    stages: HashMap<StageKey, (CachedStage, Instant)>,
}

pub struct AnalysisCache {
    ttl: Duration,
    max_videos: usize,
    videos: RwLock<HashMap<String, VideoEntry>>,
}

impl AnalysisCache {
    pub fn new(ttl: Duration, max_videos: usize) -> Self {
        Self {
            ttl,
            max_videos: max_videos.max(1),
            videos: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, video_id: &str, key: &StageKey) -> Option<CachedStage> {
        let mut videos = self.videos.write().await;
        let entry = videos.get_mut(video_id)?;

        let expired = match entry.stages.get(key) {
            Some((_, inserted_at)) => inserted_at.elapsed() > self.ttl,
            None => {
                metrics::record_cache("miss");
                return None;
            }
        };
        if expired {
            debug!(video_id, stage = %key, "Cached stage expired");
            entry.stages.remove(key);
            if entry.stages.is_empty() {
                videos.remove(video_id);
            }
            metrics::record_cache("expired");
            return None;
        }

        metrics::record_cache("hit");
        entry.stages.get(key).map(|(stage, _)| stage.clone())
    }

    pub async fn insert(&self, video_id: &str, key: StageKey, stage: CachedStage) {
        let mut videos = self.videos.write().await;
        let now = Instant::now();

        videos
            .entry(video_id.to_string())
            .or_insert_with(|| VideoEntry {
                created_at: now,
                stages: HashMap::new(),
            })
            .stages
            .insert(key, (stage, now));

        while videos.len() > self.max_videos {
            let oldest = videos
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    debug!(video_id = %id, "Evicting cached video");
                    videos.remove(&id);
                }
                None => break,
            }
        }
    }

    /// Drop a single stage for a video.
    pub async fn remove(&self, video_id: &str, key: &StageKey) {
        let mut videos = self.videos.write().await;
        if let Some(entry) = videos.get_mut(video_id) {
            entry.stages.remove(key);
            if entry.stages.is_empty() {
                videos.remove(video_id);
            }
        }
    }

    pub async fn clear_video(&self, video_id: &str) {
        self.videos.write().await.remove(video_id);
    }

    pub async fn clear_all(&self) {
        self.videos.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        let videos = self.videos.read().await;
        let mut video_ids: Vec<String> = videos.keys().cloned().collect();
        video_ids.sort();
        CacheStats {
            total_entries: videos.values().map(|v| v.stages.len()).sum(),
            video_ids,
        }
    }
}
