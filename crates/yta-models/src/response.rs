//! HTTP response envelope and small API-facing types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Standard JSON envelope returned by every API route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            cached: None,
            total: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            cached: None,
            total: None,
        }
    }

    /// Mark whether the payload was served without recomputation.
    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = Some(cached);
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

/// Public description of an analysis perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PerspectiveInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let value = serde_json::to_value(ApiResponse::ok(vec![1, 2]).with_total(2)).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": [1, 2], "total": 2}));

        let value = serde_json::to_value(ApiResponse::<()>::failure("boom")).unwrap();
        assert_eq!(value, serde_json::json!({"success": false, "error": "boom"}));
    }
}
