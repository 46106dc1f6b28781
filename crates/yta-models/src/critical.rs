//! Stage 2 results: critical analysis from an investment perspective.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CriticalAnalysis {
    pub hidden_premises: Vec<HiddenPremise>,
    pub realistic_contradictions: Vec<RealisticContradiction>,
    pub source_based_contradictions: Vec<SourceBasedContradiction>,
    pub hooking_points: Vec<HookingPoint>,
    pub content_direction: ContentDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective_name: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub perspective_insights: Vec<String>,
    pub auto_trading_connection: Vec<AutoTradingConnection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_insight: Option<AutomationInsight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HiddenPremise {
    pub premise: String,
    pub why_problem: String,
    #[serde(deserialize_with = "lenient::string")]
    pub source: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RealisticContradiction {
    pub strategy: String,
    pub difficulty_reason: String,
    #[serde(deserialize_with = "lenient::string")]
    pub evidence_data: String,
    #[serde(deserialize_with = "lenient::string")]
    pub source: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// A claim from the video set against a counterexample and its hidden condition,
/// each with its own source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SourceBasedContradiction {
    pub original_claim: String,
    #[serde(deserialize_with = "lenient::string")]
    pub original_source: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub original_source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_source_verified: Option<bool>,
    pub counterexample: String,
    #[serde(deserialize_with = "lenient::string")]
    pub counterexample_source: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub counterexample_source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterexample_source_verified: Option<bool>,
    pub hidden_condition: String,
    #[serde(deserialize_with = "lenient::string")]
    pub hidden_condition_source: String,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub hidden_condition_source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_condition_source_verified: Option<bool>,
    pub conclusion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HookingPoint {
    pub point: String,
    pub empathy_reason: String,
    pub target: String,
    #[serde(deserialize_with = "lenient::opt_u32", skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

/// Suggested video flow. Current model output is a list of steps; older
/// records carry a free-form object or plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ContentDirection {
    Steps(Vec<ContentDirectionStep>),
    Legacy(Map<String, Value>),
    Text(String),
}

impl Default for ContentDirection {
    fn default() -> Self {
        ContentDirection::Steps(Vec::new())
    }
}

impl ContentDirection {
    pub fn is_empty(&self) -> bool {
        match self {
            ContentDirection::Steps(steps) => steps.is_empty(),
            ContentDirection::Legacy(map) => map.is_empty(),
            ContentDirection::Text(text) => text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ContentDirectionStep {
    pub stage: String,
    pub example_script: String,
    pub intention: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AutoTradingConnection {
    pub strategy_content: String,
    pub implementation_method: String,
    pub tech_stack: String,
    pub feasibility: String,
    pub limitation: String,
}

// ============================================================================
// Automation insight
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AutomationInsight {
    pub video_type: String,
    pub video_type_reason: String,
    pub problem_solution_table: Vec<ProblemSolution>,
    pub core_insight: String,
    pub life_expansion: LifeExpansion,
    pub improvement_cases: Vec<ImprovementCase>,
    pub differentiation_points: Vec<DifferentiationPoint>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub improvement_search_failed: bool,
    #[serde(deserialize_with = "lenient::string_list")]
    pub suggested_search_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProblemSolution {
    pub problem: String,
    pub human_difficulty: String,
    pub automation_solution: String,
    pub implementation: String,
    pub implementation_detail: ImplementationDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImplementationDetail {
    #[serde(deserialize_with = "lenient::string")]
    pub condition: String,
    pub tool: String,
    #[serde(deserialize_with = "lenient::string")]
    pub backtest_result: String,
    pub caution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LifeExpansion {
    #[serde(deserialize_with = "lenient::boolean")]
    pub applicable: bool,
    #[serde(deserialize_with = "lenient::string_list")]
    pub areas: Vec<String>,
    pub examples: Vec<LifeExample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LifeExample {
    pub area: String,
    pub principle: String,
    pub application: String,
}

/// A documented strategy that fixed the original strategy's weakness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImprovementCase {
    pub original_limitation: String,
    pub improver: String,
    pub method: String,
    #[serde(deserialize_with = "lenient::string")]
    pub verified_result: String,
    #[serde(deserialize_with = "lenient::string")]
    pub verification_period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DifferentiationPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub summary: String,
    pub quote_template: String,
}
