//! ONNX Inference Runner Library
//!
//! Fallback scorer invoked as a subprocess: reads one JSON feature payload,
//! runs it through an ONNX model and reports a single bounded score with a
//! fixed reason code. Failures never escape as errors or exit codes.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod reconciler;
pub mod types;

pub use config::RunnerConfig;
pub use error::ScoreError;
pub use models::inference::InferenceEngine;
pub use models::loader::OrtRuntime;
pub use pipeline::score_request;
pub use types::{payload::FeaturePayload, result::{Reason, ScoreResult}};
