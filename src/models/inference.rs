//! Single-model inference for one feature payload

use crate::error::{Result, ScoreError};
use crate::models::extractor::extract_score;
use crate::models::runtime::{InferenceRuntime, ModelSession};
use crate::reconciler::reconcile;
use crate::types::payload::FeaturePayload;
use crate::types::result::ScoreResult;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scores payloads against one model file
pub struct InferenceEngine<'a, R: InferenceRuntime> {
    runtime: &'a R,
    model_path: PathBuf,
}

impl<'a, R: InferenceRuntime> InferenceEngine<'a, R> {
    /// Create an engine for `model_path` on an acquired runtime
    pub fn new<P: AsRef<Path>>(runtime: &'a R, model_path: P) -> Self {
        Self {
            runtime,
            model_path: model_path.as_ref().to_path_buf(),
        }
    }

    /// Load the model, reconcile the features to its input width, run it
    /// and extract the clamped score.
    ///
    /// Any failure is reported as an inference error carrying `payload.uid`.
    pub fn score(&self, payload: FeaturePayload) -> Result<ScoreResult> {
        let FeaturePayload { uid, features } = payload;

        match self.run_model(features) {
            Ok(score) => Ok(ScoreResult::scored(score, uid)),
            Err(e) => Err(ScoreError::inference(uid, e)),
        }
    }

    fn run_model(&self, features: Vec<f64>) -> anyhow::Result<f64> {
        let mut session = self.runtime.load(&self.model_path)?;

        let contract = session
            .input_contract()
            .context("Failed to describe model input")?;
        let expected = contract.expected_width();
        let supplied = features.len();

        let features = reconcile(features, expected);
        debug!(
            input = %contract.name,
            supplied = supplied,
            expected = ?expected,
            width = features.len(),
            "Features reconciled"
        );

        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let output = session.run(&contract.name, row)?;

        let score = extract_score(&output)?;
        debug!(output_shape = ?output.shape, score = score, "Score extracted");

        Ok(score)
    }
}
