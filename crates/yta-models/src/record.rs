//! Persisted analysis rows.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::additional::AdditionalAnalysis;
use crate::critical::CriticalAnalysis;
use crate::lenient;
use crate::video_analysis::{SuitabilityAnalysis, VideoAnalysis};

/// Columns projected for the history listing.
pub const HISTORY_COLUMNS: &str =
    "id,video_id,video_title,video_url,channel_name,thumbnail_url,created_at";

/// A stored analysis: video identity, stage 1 results and the optional later stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisRecord {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub video_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub video_title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub video_url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub channel_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub thumbnail_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(flatten)]
    pub analysis: VideoAnalysis,
    pub suitability_analysis: Option<SuitabilityAnalysis>,
    pub perspective: Option<String>,
    pub critical_analysis: Option<CriticalAnalysis>,
    pub additional_analysis: Option<AdditionalAnalysis>,
    pub created_at: Option<DateTime<Utc>>,
}

impl AnalysisRecord {
    /// Materialize a new row with its store-assigned identity.
    pub fn from_new(id: impl Into<String>, new: NewAnalysis, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            video_id: new.video_id,
            video_title: new.video_title,
            video_url: new.video_url,
            channel_name: new.channel_name,
            thumbnail_url: new.thumbnail_url,
            transcript: new.transcript,
            analysis: new.analysis,
            suitability_analysis: new.suitability_analysis,
            perspective: None,
            critical_analysis: None,
            additional_analysis: None,
            created_at: Some(created_at),
        }
    }

    /// True once stage 1 has produced a summary.
    pub fn has_summary(&self) -> bool {
        !self.analysis.summary.trim().is_empty()
    }

    pub fn apply(&mut self, patch: AnalysisPatch) {
        if let Some(perspective) = patch.perspective {
            self.perspective = Some(perspective);
        }
        if let Some(critical) = patch.critical_analysis {
            self.critical_analysis = Some(critical);
        }
        if let Some(additional) = patch.additional_analysis {
            self.additional_analysis = additional;
        }
    }
}

/// Insert payload for a fresh stage 1 analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAnalysis {
    pub video_id: String,
    pub video_title: String,
    pub video_url: String,
    pub channel_name: String,
    pub thumbnail_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(flatten)]
    pub analysis: VideoAnalysis,
    pub suitability_analysis: Option<SuitabilityAnalysis>,
}

/// Partial update for the later stages. `None` fields are left untouched.
///
/// `additional_analysis: Some(None)` clears the stored stage 3 result and
/// serializes as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_analysis: Option<CriticalAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_analysis: Option<Option<AdditionalAnalysis>>,
}

impl AnalysisPatch {
    /// New stage 2 result. Stage 3 was derived from the previous one, so it is cleared.
    pub fn critical(perspective: impl Into<String>, critical: CriticalAnalysis) -> Self {
        Self {
            perspective: Some(perspective.into()),
            critical_analysis: Some(critical),
            additional_analysis: Some(None),
        }
    }

    pub fn additional(additional: AdditionalAnalysis) -> Self {
        Self {
            additional_analysis: Some(Some(additional)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.perspective.is_none()
            && self.critical_analysis.is_none()
            && self.additional_analysis.is_none()
    }
}

/// One row of the analysis history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HistoryItem {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub video_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub video_title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub video_url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub channel_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub thumbnail_url: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&AnalysisRecord> for HistoryItem {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            id: record.id.clone(),
            video_id: record.video_id.clone(),
            video_title: record.video_title.clone(),
            video_url: record.video_url.clone(),
            channel_name: record.channel_name.clone(),
            thumbnail_url: record.thumbnail_url.clone(),
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video_analysis::Quote;
    use serde_json::json;

    fn sample_new() -> NewAnalysis {
        NewAnalysis {
            video_id: "dQw4w9WgXcQ".into(),
            video_title: "버핏의 투자 원칙".into(),
            video_url: "https://youtu.be/dQw4w9WgXcQ".into(),
            channel_name: "투자 채널".into(),
            analysis: VideoAnalysis {
                summary: "요약".into(),
                quotes: vec![Quote::new("가격은 지불하는 것", "워렌 버핏")],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_new_analysis_serializes_flat() {
        let value = serde_json::to_value(sample_new()).unwrap();
        assert_eq!(value["summary"], "요약");
        assert_eq!(value["quotes"][0]["speaker"], "워렌 버핏");
        assert!(value.get("analysis").is_none());
        assert!(value.get("transcript").is_none());
    }

    #[test]
    fn test_record_from_store_row_with_nulls() {
        let record: AnalysisRecord = serde_json::from_value(json!({
            "id": "a1b2",
            "video_id": "dQw4w9WgXcQ",
            "video_title": "제목",
            "video_url": "https://youtu.be/dQw4w9WgXcQ",
            "channel_name": null,
            "thumbnail_url": "",
            "summary": "요약",
            "key_points": null,
            "quotes": ["legacy string quote"],
            "suitability_analysis": null,
            "perspective": null,
            "critical_analysis": null,
            "additional_analysis": null,
            "created_at": "2025-01-02T03:04:05.123456+00:00"
        }))
        .unwrap();

        assert!(record.has_summary());
        assert_eq!(record.channel_name, "");
        assert!(record.analysis.key_points.is_empty());
        assert_eq!(record.analysis.quotes[0].text, "legacy string quote");
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_apply_patch() {
        let mut record = AnalysisRecord::from_new("id-1", sample_new(), Utc::now());
        assert!(record.perspective.is_none());

        record.apply(AnalysisPatch::critical("value_investing", CriticalAnalysis::default()));
        assert_eq!(record.perspective.as_deref(), Some("value_investing"));
        assert!(record.critical_analysis.is_some());
        assert!(record.additional_analysis.is_none());

        record.apply(AnalysisPatch::additional(AdditionalAnalysis::default()));
        assert!(record.additional_analysis.is_some());
        assert_eq!(record.perspective.as_deref(), Some("value_investing"));

        let item = HistoryItem::from(&record);
        assert_eq!(item.id, "id-1");
        assert_eq!(item.video_title, "버핏의 투자 원칙");

        record.apply(AnalysisPatch::critical("psychology", CriticalAnalysis::default()));
        assert_eq!(record.perspective.as_deref(), Some("psychology"));
        assert!(record.additional_analysis.is_none());
    }

    #[test]
    fn test_critical_patch_nulls_additional_column() {
        let value =
            serde_json::to_value(AnalysisPatch::critical("psychology", CriticalAnalysis::default()))
                .unwrap();
        assert_eq!(value["perspective"], "psychology");
        assert!(value["additional_analysis"].is_null());
        assert!(value.as_object().unwrap().contains_key("additional_analysis"));

        let value = serde_json::to_value(AnalysisPatch::default()).unwrap();
        assert!(value.as_object().unwrap().is_empty());
    }
}
