//! Staged scoring pipeline
//!
//! runtime check -> payload load -> inference -> result.
//! The first failing stage decides the reason code; nothing is retried.

use crate::error::{Result, ScoreError};
use crate::models::inference::InferenceEngine;
use crate::models::runtime::InferenceRuntime;
use crate::types::payload::FeaturePayload;
use crate::types::result::ScoreResult;
use std::path::Path;
use tracing::{debug, warn};

/// Run the whole pipeline, converting any failure into a result record.
///
/// `runtime` is the outcome of acquiring the runtime; it is checked before
/// the payload file is touched.
pub fn score_request<R: InferenceRuntime>(
    runtime: anyhow::Result<R>,
    model_path: &Path,
    input_path: &Path,
) -> ScoreResult {
    match try_score(runtime, model_path, input_path) {
        Ok(result) => {
            debug!(uid = %result.uid, score = result.score, "Scoring complete");
            result
        }
        Err(e) => failure_result(e),
    }
}

/// Log a classified failure and convert it into its result record
pub fn failure_result(error: ScoreError) -> ScoreResult {
    let result = error.to_result();
    warn!(
        reason = %result.reason,
        uid = %result.uid,
        error = %format!("{:#}", anyhow::Error::new(error)),
        "Scoring failed"
    );
    result
}

fn try_score<R: InferenceRuntime>(
    runtime: anyhow::Result<R>,
    model_path: &Path,
    input_path: &Path,
) -> Result<ScoreResult> {
    let runtime = runtime.map_err(ScoreError::RuntimeUnavailable)?;

    let payload = FeaturePayload::load(input_path)?;

    InferenceEngine::new(&runtime, model_path).score(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inference::testing::FakeRuntime;
    use crate::models::runtime::OutputTensor;
    use crate::types::result::Reason;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn payload_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn binary_model() -> FakeRuntime {
        FakeRuntime::new(
            vec![None, Some(3)],
            OutputTensor::new(vec![1, 2], vec![0.3, 0.7]),
        )
    }

    #[test]
    fn test_successful_scoring() {
        let input = payload_file(r#"{"uid": "u1", "features": [0.1, 0.2]}"#);

        let result = score_request(Ok(binary_model()), Path::new("m.onnx"), input.path());

        assert_eq!(result, ScoreResult::scored(0.7, "u1"));
    }

    #[test]
    fn test_missing_runtime_checked_before_payload() {
        // payload path does not exist: the runtime failure still wins
        let result = score_request::<FakeRuntime>(
            Err(anyhow::anyhow!("libonnxruntime not found")),
            Path::new("m.onnx"),
            Path::new("/nonexistent/input.json"),
        );

        assert_eq!(result.score, 0.0);
        assert_eq!(result.uid, "-");
        assert_eq!(result.reason, Reason::RuntimeUnavailable);
    }

    #[test]
    fn test_malformed_payload() {
        let input = payload_file(r#"{"uid": "u1", "features": "not-a-list"}"#);

        let result = score_request(Ok(binary_model()), Path::new("m.onnx"), input.path());

        assert_eq!(result, ScoreResult::failure("-", Reason::FeaturesParseError));
    }

    #[test]
    fn test_inference_failure_reports_resolved_uid() {
        let input = payload_file(r#"{"app_uid": "pkg.app", "vector": [1, 2, 3]}"#);

        let result = score_request(
            Ok(FakeRuntime::failing_load()),
            Path::new("broken.onnx"),
            input.path(),
        );

        assert_eq!(result, ScoreResult::failure("pkg.app", Reason::InferenceError));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let input = payload_file("[0.5, 0.25, 0.125, 1.0]");

        let first = score_request(Ok(binary_model()), Path::new("m.onnx"), input.path());
        let second = score_request(Ok(binary_model()), Path::new("m.onnx"), input.path());

        assert_eq!(first, second);
        assert_eq!(first.to_line(), second.to_line());
    }

    #[test]
    fn test_failure_result_keeps_uid_and_reason() {
        let err = ScoreError::inference("u9", anyhow::anyhow!("session failed"));

        let result = failure_result(err);

        assert_eq!(result, ScoreResult::failure("u9", Reason::InferenceError));
    }

    #[test]
    fn test_logged_error_includes_source() {
        let err = ScoreError::FeaturesParse(anyhow::anyhow!("features must be a list"));
        assert_eq!(
            format!("{:#}", anyhow::Error::new(err)),
            "failed to parse feature payload: features must be a list"
        );
    }
}
