//! Stage 1 results: video analysis and topic suitability.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::lenient;

/// Default level for empathy / source availability.
pub const DEFAULT_LEVEL: &str = "중간";
/// Default suitability score (1-5 scale).
pub const DEFAULT_SUITABILITY_SCORE: u32 = 3;
/// Default usage recommendation ("reference only").
pub const DEFAULT_USAGE_RECOMMENDATION: &str = "참고만";

// ============================================================================
// Video analysis
// ============================================================================

/// Summary-level analysis of a video transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VideoAnalysis {
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::string")]
    pub key_message: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub key_points: Vec<String>,
    #[serde(deserialize_with = "lenient::one_or_many")]
    pub quotes: Vec<Quote>,
    #[serde(deserialize_with = "lenient::one_or_many")]
    pub people: Vec<Person>,
    #[serde(deserialize_with = "lenient::string")]
    pub investment_strategy: String,
    #[serde(deserialize_with = "lenient::one_or_many")]
    pub source_tracking: Vec<SourceTracking>,
    #[serde(deserialize_with = "lenient::one_or_many")]
    pub video_structure: Vec<VideoStructureItem>,
    #[serde(deserialize_with = "lenient::string")]
    pub structure_summary: String,
}

/// A quotable line and its speaker.
///
/// Deserializes from either `{"text", "speaker"}` or a bare string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Quote {
    pub text: String,
    pub speaker: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
        }
    }
}

impl<'de> Deserialize<'de> for Quote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(mut map) => Quote {
                text: map.remove("text").map(lenient::value_to_text).unwrap_or_default(),
                speaker: map
                    .remove("speaker")
                    .map(lenient::value_to_text)
                    .unwrap_or_default(),
            },
            other => Quote::new(lenient::value_to_text(other), ""),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Person {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub related_links: Vec<String>,
}

/// Where a quote originally came from, as claimed by the model and then verified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SourceTracking {
    #[serde(deserialize_with = "lenient::string")]
    pub quote: String,
    #[serde(deserialize_with = "lenient::string")]
    pub source_title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub source_type: String,
    #[serde(
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_url: Option<String>,
    #[serde(
        deserialize_with = "lenient::opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub reliability: Option<u32>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub search_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VideoStructureItem {
    #[serde(
        deserialize_with = "lenient::opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<u32>,
    #[serde(deserialize_with = "lenient::string")]
    pub element: String,
    #[serde(
        rename = "type",
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
}

// ============================================================================
// Suitability
// ============================================================================

/// Whether a video is suitable material for critical analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Judgment {
    Suitable,
    #[default]
    OnHold,
    Unsuitable,
}

impl Judgment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Suitable => "적합",
            Judgment::OnHold => "보류",
            Judgment::Unsuitable => "부적합",
        }
    }

    /// Classify a free-form judgment string.
    pub fn classify(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("부적합") || label.contains("unsuitable") {
            Judgment::Unsuitable
        } else if label.contains("보류") || label.contains("hold") {
            Judgment::OnHold
        } else if label.contains("적합") || label.contains("suitable") {
            Judgment::Suitable
        } else {
            Judgment::OnHold
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Judgment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Judgment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Judgment::classify(&lenient::value_to_text(value)))
    }
}

impl JsonSchema for Judgment {
    fn schema_name() -> String {
        "Judgment".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SuitabilityItem {
    #[serde(deserialize_with = "lenient::boolean")]
    pub exists: bool,
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SuitabilityLevel {
    #[serde(deserialize_with = "lenient::string")]
    pub level: String,
    #[serde(deserialize_with = "lenient::string")]
    pub reason: String,
}

impl Default for SuitabilityLevel {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            reason: String::new(),
        }
    }
}

/// Topic suitability assessment produced alongside the stage 1 analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SuitabilityAnalysis {
    pub feasibility_issue: SuitabilityItem,
    pub hidden_premise: SuitabilityItem,
    pub criticism_point: SuitabilityItem,
    pub target_empathy: SuitabilityLevel,
    pub source_availability: SuitabilityLevel,
    #[serde(deserialize_with = "suitability_score")]
    pub suitability_score: u32,
    pub judgment: Judgment,
    #[serde(deserialize_with = "lenient::string")]
    pub usage_recommendation: String,
    #[serde(
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub unsuitable_reason: Option<String>,
}

impl Default for SuitabilityAnalysis {
    fn default() -> Self {
        Self {
            feasibility_issue: SuitabilityItem::default(),
            hidden_premise: SuitabilityItem::default(),
            criticism_point: SuitabilityItem::default(),
            target_empathy: SuitabilityLevel::default(),
            source_availability: SuitabilityLevel::default(),
            suitability_score: DEFAULT_SUITABILITY_SCORE,
            judgment: Judgment::OnHold,
            usage_recommendation: DEFAULT_USAGE_RECOMMENDATION.to_string(),
            unsuitable_reason: None,
        }
    }
}

impl SuitabilityAnalysis {
    /// Replace blank levels and recommendations with their defaults.
    pub fn normalize(mut self) -> Self {
        for level in [&mut self.target_empathy, &mut self.source_availability] {
            if level.level.trim().is_empty() {
                level.level = DEFAULT_LEVEL.to_string();
            }
        }
        if self.usage_recommendation.trim().is_empty() {
            self.usage_recommendation = DEFAULT_USAGE_RECOMMENDATION.to_string();
        }
        self
    }

    pub fn is_unsuitable(&self) -> bool {
        self.judgment == Judgment::Unsuitable
    }
}

fn suitability_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient::opt_u32(deserializer)?
        .filter(|score| *score > 0)
        .map(|score| score.min(5))
        .unwrap_or(DEFAULT_SUITABILITY_SCORE))
}

/// Raw stage 1 model response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StageOneOutput {
    pub video_analysis: VideoAnalysis,
    pub suitability_analysis: Option<SuitabilityAnalysis>,
}

impl StageOneOutput {
    /// Parse model output, accepting both the wrapped and the flat layout.
    pub fn from_model_value(value: Value) -> Result<Self, serde_json::Error> {
        let wrapped = value
            .as_object()
            .is_some_and(|map| map.contains_key("video_analysis"));
        if wrapped {
            return lenient::from_model_value(value);
        }

        let mut value = value;
        let suitability = value
            .as_object_mut()
            .and_then(|map| map.remove("suitability_analysis"));
        Ok(Self {
            video_analysis: lenient::from_model_value(value)?,
            suitability_analysis: suitability
                .filter(Value::is_object)
                .map(lenient::from_model_value)
                .transpose()?,
        })
    }
}
