//! Stage 3 results: production-ready content planning.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AdditionalAnalysis {
    pub thumbnail_suggestions: Vec<ThumbnailSuggestion>,
    pub title_suggestions: Vec<TitleSuggestion>,
    pub video_length: VideoLength,
    pub script_directions: Vec<ScriptDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_tip: Option<BonusTip>,
    pub video_sources: VideoSources,
    pub performance_prediction: PerformancePrediction,
    pub membership_connection: MembershipConnection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ThumbnailSuggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub basis: String,
    pub click_psychology: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TitleSuggestion {
    pub pattern: String,
    pub title: String,
    pub basis: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VideoLength {
    pub recommended_length: String,
    pub format: String,
    pub judgment_basis: String,
    pub parts: Vec<VideoPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VideoPart {
    pub part: String,
    pub time_range: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScriptDirection {
    pub part: String,
    pub keypoint: String,
    pub basis: String,
    pub emotion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BonusTip {
    pub topic: String,
    pub summary: String,
    pub why_helpful: String,
    #[serde(deserialize_with = "lenient::string")]
    pub source: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

// ============================================================================
// Production sources
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VideoSources {
    pub interview_clips: Vec<InterviewClip>,
    pub evidence_sources: Vec<EvidenceSource>,
    pub broll_keywords: Vec<BrollKeyword>,
    pub veo3_prompts: Vec<Veo3Prompt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InterviewClip {
    pub person: String,
    pub video_title: String,
    pub quote: String,
    #[serde(deserialize_with = "lenient::string")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EvidenceSource {
    pub contradiction: String,
    pub evidence: String,
    pub source_type: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BrollKeyword {
    pub scene: String,
    pub keyword: String,
    pub usage_part: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Veo3Prompt {
    pub scene: String,
    pub prompt: String,
    pub usage_part: String,
}

// ============================================================================
// Performance prediction
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PerformancePrediction {
    pub target_fits: Vec<TargetFit>,
    pub controversy: Controversy,
    pub expected_comments: Vec<ExpectedComment>,
    pub series_expansions: Vec<SeriesExpansion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TargetFit {
    pub target: String,
    #[serde(deserialize_with = "lenient::opt_u32", skip_serializing_if = "Option::is_none")]
    pub fit_level: Option<u32>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Controversy {
    #[serde(deserialize_with = "lenient::opt_u32", skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    pub expected_reactions: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExpectedComment {
    #[serde(rename = "type")]
    pub kind: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SeriesExpansion {
    pub topic: String,
    pub connection: String,
}

// ============================================================================
// Membership
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MembershipConnection {
    pub timings: Vec<MembershipTiming>,
    pub contexts: Vec<MembershipContext>,
    pub teasers: Vec<MembershipTeaser>,
    pub content_suggestions: Vec<MembershipContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MembershipTiming {
    #[serde(deserialize_with = "lenient::string")]
    pub timing: String,
    pub video_position: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MembershipContext {
    pub previous_line: String,
    pub connection: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MembershipTeaser {
    pub situation: String,
    pub teaser: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MembershipContent {
    pub topic: String,
    pub connection: String,
}
