//! Three-stage YouTube content analysis.
//!
//! This crate provides:
//! - [`AnalysisPipeline`]: video analysis, critical analysis and additional
//!   analysis with caching, short-circuiting and source verification
//! - Prompt builders and the perspectives registry
//! - [`AnalysisCache`], the volatile per-video stage cache

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod perspectives;
pub mod pipeline;
pub mod prompts;
pub mod verification;

pub use cache::{AnalysisCache, CacheStats, CachedStage, StageKey};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use logging::StageLogger;
pub use perspectives::{get_perspective, Perspective, DEFAULT_PERSPECTIVE, PERSPECTIVES};
pub use pipeline::{AnalysisPipeline, AnalyzeOnlyOutput, Analyzed, HistoryPage, VideoStageResult};
