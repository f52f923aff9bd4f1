//! Failure classes of the scoring pipeline
//!
//! Every stage returns `Result<_, ScoreError>`. The variant decides which
//! reason code is emitted; the wrapped source is only ever logged.

use crate::types::result::{Reason, ScoreResult, UNKNOWN_UID};
use thiserror::Error;

/// Result type alias for pipeline stages
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Terminal failure of one pipeline stage
#[derive(Error, Debug)]
pub enum ScoreError {
    /// Required flags missing or unparseable
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// The inference runtime could not be acquired at all
    #[error("inference runtime unavailable")]
    RuntimeUnavailable(#[source] anyhow::Error),

    /// Input file unreadable or not a numeric feature sequence
    #[error("failed to parse feature payload")]
    FeaturesParse(#[source] anyhow::Error),

    /// Model load, session run or score extraction failed
    #[error("inference failed for uid {uid}")]
    Inference {
        uid: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ScoreError {
    /// Wrap an inference-stage failure, keeping the uid resolved so far
    pub fn inference(uid: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Inference {
            uid: uid.into(),
            source,
        }
    }

    /// Reason code emitted for this failure
    pub fn reason(&self) -> Reason {
        match self {
            Self::InvalidArgs(_) => Reason::InvalidArgs,
            Self::RuntimeUnavailable(_) => Reason::RuntimeUnavailable,
            Self::FeaturesParse(_) => Reason::FeaturesParseError,
            Self::Inference { .. } => Reason::InferenceError,
        }
    }

    /// Identifier reported alongside the failure
    pub fn uid(&self) -> &str {
        match self {
            Self::Inference { uid, .. } => uid.as_str(),
            _ => UNKNOWN_UID,
        }
    }

    /// Terminal result record for this failure (score 0.0)
    pub fn to_result(&self) -> ScoreResult {
        ScoreResult::failure(self.uid(), self.reason())
    }
}
