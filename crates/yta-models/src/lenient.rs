//! Tolerant deserialization helpers for language-model output.
//!
//! Model JSON is loosely typed: fields come back as `null`, numbers arrive as
//! strings (`"4/5"`), single values arrive where a list was asked for. These
//! helpers are wired in with `#[serde(deserialize_with = ...)]` so the typed
//! models keep their shape regardless.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Remove `null` object members and `null` array elements, recursively.
pub fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

/// Deserialize model output after dropping every `null`.
pub fn from_model_value<T: DeserializeOwned>(mut value: Value) -> Result<T, serde_json::Error> {
    strip_nulls(&mut value);
    serde_json::from_value(value)
}

/// Render a scalar as text. Objects and arrays become compact JSON.
pub fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Parse a number from a number or a string starting with digits (`"4/5"` → 4).
pub fn parse_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = value_to_text(Value::deserialize(deserializer)?);
    Ok((!text.is_empty()).then_some(text))
}

/// Accept a list of scalars/objects or a single string.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(|v| !v.is_null())
            .map(value_to_text)
            .collect(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::Null => Vec::new(),
        other => vec![value_to_text(other)],
    })
}

pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_u32(&Value::deserialize(deserializer)?))
}

pub fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "예" | "네" | "있음"
        ),
        _ => false,
    })
}

/// Accept either a list of `T` or a single `T`.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
            .collect(),
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        other => serde_json::from_value(other)
            .map(|item| vec![item])
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "opt_u32")]
        score: Option<u32>,
        #[serde(deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(deserialize_with = "boolean")]
        exists: bool,
        name: String,
    }

    #[test]
    fn test_strip_nulls_nested() {
        let mut value = json!({"a": null, "b": [1, null, {"c": null, "d": 2}]});
        strip_nulls(&mut value);
        assert_eq!(value, json!({"b": [1, {"d": 2}]}));
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(parse_u32(&json!("4/5")), Some(4));
        assert_eq!(parse_u32(&json!(" 3 ")), Some(3));
        assert_eq!(parse_u32(&json!(3.6)), Some(4));
        assert_eq!(parse_u32(&json!("높음")), None);
        assert_eq!(parse_u32(&json!(-1)), None);
    }

    #[test]
    fn test_sample_from_sloppy_model_output() {
        let sample: Sample = from_model_value(json!({
            "score": "4/5",
            "tags": "single",
            "exists": "true",
            "name": null
        }))
        .unwrap();

        assert_eq!(sample.score, Some(4));
        assert_eq!(sample.tags, vec!["single"]);
        assert!(sample.exists);
        assert_eq!(sample.name, "");
    }

    #[test]
    fn test_string_list_renders_objects_as_json() {
        let sample: Sample = from_model_value(json!({"tags": [1, {"k": "v"}, "x"]})).unwrap();
        assert_eq!(sample.tags, vec!["1", r#"{"k":"v"}"#, "x"]);
    }
}
