//! Shared data models for the YouTube analyzer backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video metadata and YouTube ID extraction
//! - The three analysis stages (video analysis, critical analysis, additional analysis)
//! - The persisted analysis record and history listing
//! - The JSON response envelope used by the HTTP API

pub mod additional;
pub mod critical;
pub mod lenient;
pub mod record;
pub mod response;
pub mod source;
pub mod video;
pub mod video_analysis;
pub mod youtube_id;

// Re-export common types
pub use additional::{
    AdditionalAnalysis, BonusTip, EvidenceSource, InterviewClip, MembershipConnection,
    PerformancePrediction, ScriptDirection, ThumbnailSuggestion, TitleSuggestion, VideoLength,
    VideoSources,
};
pub use critical::{
    AutomationInsight, ContentDirection, ContentDirectionStep, CriticalAnalysis, HiddenPremise, HookingPoint,
    ImprovementCase, RealisticContradiction, SourceBasedContradiction,
};
pub use record::{AnalysisPatch, AnalysisRecord, HistoryItem, NewAnalysis, HISTORY_COLUMNS};
pub use response::{ApiResponse, PerspectiveInfo};
pub use source::SourceType;
pub use video::{view_sub_ratio, VideoInfo};
pub use video_analysis::{
    Judgment, Person, Quote, SourceTracking, StageOneOutput, SuitabilityAnalysis,
    SuitabilityItem, SuitabilityLevel, VideoAnalysis, VideoStructureItem,
};
pub use youtube_id::{extract_youtube_id, is_valid_youtube_id, YoutubeIdError, YoutubeIdResult};
