//! Feature payload loading and normalization
//!
//! The payload file is JSON, either a bare array of numbers or an object:
//!
//! ```json
//! {"uid": "u1", "features": [0.1, 0.2]}
//! ```
//!
//! The identifier is read from `uid`, then `app_uid`. The vector is read from
//! `features`, then `vector`; an object with neither key is itself treated
//! as the vector and fails normalization.
//!
//! `NaN`, `Infinity` and out-of-range number literals are accepted; see
//! [`crate::types::json`].

use crate::error::{Result, ScoreError};
use crate::types::json::{self, raw_number, raw_number_value};
use crate::types::result::UNKNOWN_UID;
use crate::types::uid::render_uid;
use anyhow::{anyhow, Context};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Identifier keys, first match wins
const UID_KEYS: [&str; 2] = ["uid", "app_uid"];

/// Feature vector keys, first match wins
const FEATURE_KEYS: [&str; 2] = ["features", "vector"];

/// Normalized feature payload
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePayload {
    /// Request identifier, `-` when absent
    pub uid: String,
    /// Ordered feature values
    pub features: Vec<f64>,
}

impl FeaturePayload {
    /// Read and normalize a payload file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload from {:?}", path))
            .map_err(ScoreError::FeaturesParse)?;

        let payload = Self::from_json_str(&text)?;

        debug!(
            path = %path.display(),
            uid = %payload.uid,
            features = payload.features.len(),
            "Payload loaded"
        );

        Ok(payload)
    }

    /// Normalize a payload from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document = json::from_str(text)
            .context("Payload is not valid JSON")
            .map_err(ScoreError::FeaturesParse)?;

        Self::from_value(&document)
    }

    /// Normalize an already decoded document
    pub fn from_value(document: &Value) -> Result<Self> {
        let (uid, source) = match document {
            Value::Object(map) => {
                let uid = UID_KEYS
                    .iter()
                    .find_map(|key| map.get(*key))
                    .map(render_uid)
                    .unwrap_or_else(|| UNKNOWN_UID.to_string());

                let source = FEATURE_KEYS
                    .iter()
                    .find_map(|key| map.get(*key))
                    .unwrap_or(document);

                (uid, source)
            }
            _ => (UNKNOWN_UID.to_string(), document),
        };

        let features = coerce_features(source).map_err(ScoreError::FeaturesParse)?;

        Ok(Self { uid, features })
    }
}

fn coerce_features(source: &Value) -> anyhow::Result<Vec<f64>> {
    let items = source
        .as_array()
        .ok_or_else(|| anyhow!("features must be a list, got {}", kind_of(source)))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            coerce_float(item).with_context(|| format!("feature {} is not numeric", index))
        })
        .collect()
}

fn coerce_float(value: &Value) -> anyhow::Result<f64> {
    if let Some(token) = raw_number(value) {
        return raw_number_value(token)
            .ok_or_else(|| anyhow!("integer {} too large to convert to float", token));
    }

    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow!("number {} out of range", n)),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("cannot convert {:?} to float", s)),
        other => Err(anyhow!("cannot convert {} to float", kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> Result<FeaturePayload> {
        FeaturePayload::from_json_str(text)
    }

    #[test]
    fn test_uid_precedence() {
        let payload = parse(r#"{"uid": "a", "app_uid": "b", "features": [1, 2]}"#).unwrap();
        assert_eq!(payload.uid, "a");

        let payload = parse(r#"{"app_uid": "b", "vector": [1, 2]}"#).unwrap();
        assert_eq!(payload.uid, "b");
        assert_eq!(payload.features, vec![1.0, 2.0]);
    }

    #[test]
    fn test_bare_list() {
        let payload = parse("[1, 2, 3]").unwrap();
        assert_eq!(payload.uid, "-");
        assert_eq!(payload.features, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_features_key_wins_over_vector() {
        let payload = parse(r#"{"features": [1, 2], "vector": [9, 9, 9]}"#).unwrap();
        assert_eq!(payload.features, vec![1.0, 2.0]);
    }

    #[test]
    fn test_uid_coercion() {
        assert_eq!(parse(r#"{"uid": 10123, "features": []}"#).unwrap().uid, "10123");
        assert_eq!(parse(r#"{"uid": 1.5, "features": []}"#).unwrap().uid, "1.5");
        assert_eq!(parse(r#"{"uid": true, "features": []}"#).unwrap().uid, "True");
        assert_eq!(parse(r#"{"uid": [1, 2], "features": []}"#).unwrap().uid, "[1, 2]");
        assert_eq!(parse(r#"{"uid": {"a": 1}, "features": []}"#).unwrap().uid, "{'a': 1}");
        assert_eq!(parse(r#"{"uid": 0.00001, "features": []}"#).unwrap().uid, "1e-05");
        assert_eq!(
            parse(r#"{"uid": 12345678901234567890123, "features": []}"#).unwrap().uid,
            "12345678901234567890123"
        );
        // A present uid wins even when null
        assert_eq!(
            parse(r#"{"uid": null, "app_uid": "b", "features": []}"#).unwrap().uid,
            "None"
        );
    }

    #[test]
    fn test_element_coercion() {
        let payload = parse(r#"{"features": [1, 2.5, " 3 ", true, false]}"#).unwrap();
        assert_eq!(payload.features, vec![1.0, 2.5, 3.0, 1.0, 0.0]);
    }

    #[test]
    fn test_non_finite_literals() {
        let payload = parse("[NaN, 1.0]").unwrap();
        assert!(payload.features[0].is_nan());
        assert_eq!(payload.features[1], 1.0);

        let payload = parse(r#"{"uid": NaN, "features": [Infinity, -Infinity, 1e400]}"#).unwrap();
        assert_eq!(payload.uid, "nan");
        assert_eq!(
            payload.features,
            vec![f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY]
        );

        // still strings when quoted
        let payload = parse(r#"{"uid": "NaN", "features": ["Infinity"]}"#).unwrap();
        assert_eq!(payload.uid, "NaN");
        assert_eq!(payload.features, vec![f64::INFINITY]);
    }

    #[test]
    fn test_huge_integer_feature_fails() {
        let text = format!("[1{}]", "0".repeat(400));
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, ScoreError::FeaturesParse(_)));

        let payload = parse("[12345678901234567890123]").unwrap();
        assert_eq!(payload.features, vec![1.2345678901234568e22]);
    }

    #[test]
    fn test_features_not_a_list() {
        let err = parse(r#"{"features": "not-a-list"}"#).unwrap_err();
        assert!(matches!(err, ScoreError::FeaturesParse(_)));
    }

    #[test]
    fn test_object_without_feature_keys_fails() {
        let err = parse(r#"{"uid": "u1", "other": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ScoreError::FeaturesParse(_)));
    }

    #[test]
    fn test_non_numeric_element_fails() {
        assert!(parse(r#"[1, "abc"]"#).is_err());
        assert!(parse(r#"[1, null]"#).is_err());
        assert!(parse(r#"[1, [2]]"#).is_err());
    }

    #[test]
    fn test_scalar_document_fails() {
        assert!(parse("42").is_err());
        assert!(parse("not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"uid": "u1", "features": [0.1, 0.2]}}"#).unwrap();

        let payload = FeaturePayload::load(file.path()).unwrap();
        assert_eq!(payload.uid, "u1");
        assert_eq!(payload.features, vec![0.1, 0.2]);
    }

    #[test]
    fn test_missing_file() {
        let err = FeaturePayload::load("/nonexistent/payload.json").unwrap_err();
        assert!(matches!(err, ScoreError::FeaturesParse(_)));
    }
}
