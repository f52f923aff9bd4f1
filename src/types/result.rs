//! Result record written to stdout

use serde::{Serialize, Serializer};
use std::io::Write;

/// Placeholder identifier when none was resolved
pub const UNKNOWN_UID: &str = "-";

/// Terminal status of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Score produced by the model
    ModelInference,
    /// Required flags missing
    InvalidArgs,
    /// Inference runtime could not be acquired
    RuntimeUnavailable,
    /// Payload unreadable or not numeric
    FeaturesParseError,
    /// Model load, run or extraction failed
    InferenceError,
}

impl Reason {
    /// Wire value of this reason code. `RuntimeUnavailable` keeps the name
    /// existing callers match on.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::ModelInference => "model_inference",
            Reason::InvalidArgs => "invalid_args",
            Reason::RuntimeUnavailable => "python_dep_missing",
            Reason::FeaturesParseError => "features_parse_error",
            Reason::InferenceError => "onnx_inference_error",
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{score, uid, reason}` line consumed by the calling process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Score in [0, 1]
    pub score: f64,
    /// Request identifier, `-` when unknown
    pub uid: String,
    /// Status code
    pub reason: Reason,
}

impl ScoreResult {
    /// Successful model score; the value is clamped into [0, 1]
    pub fn scored(score: f64, uid: impl Into<String>) -> Self {
        Self {
            score: clamp_score(score),
            uid: uid.into(),
            reason: Reason::ModelInference,
        }
    }

    /// Failure record with a zero score
    pub fn failure(uid: impl Into<String>, reason: Reason) -> Self {
        Self {
            score: 0.0,
            uid: uid.into(),
            reason,
        }
    }

    /// Serialize as a single JSON line
    pub fn to_line(&self) -> String {
        // Only finite floats, strings and unit variants: cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"score":0.0,"uid":"-","reason":"{}"}}"#,
                Reason::InferenceError
            )
        })
    }

    /// Write the line plus newline and flush
    pub fn write_line<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "{}", self.to_line())?;
        out.flush()
    }
}

/// Clamp into [0, 1]. `NaN` maps to 1.0: min against 1.0 first, then max against 0.0.
pub fn clamp_score(score: f64) -> f64 {
    let upper = if score < 1.0 { score } else { 1.0 };
    if upper > 0.0 {
        upper
    } else {
        0.0
    }
}
