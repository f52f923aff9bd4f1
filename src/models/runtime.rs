//! Inference runtime seam
//!
//! The pipeline only needs three capabilities from an engine: load a model
//! by path, describe its first input, and run a forward pass on one
//! `[1, N]` float row. `OrtRuntime` is the production implementation.

use anyhow::Result;
use std::path::Path;

/// Declared shape of the model's first input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputContract {
    /// Input name to bind the feature tensor to
    pub name: String,
    /// Dimension sizes; `None` for symbolic or dynamic dimensions
    pub shape: Vec<Option<i64>>,
}

/// First output tensor of a forward pass, widened to f64
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
    /// Dimension sizes
    pub shape: Vec<usize>,
    /// Row-major values
    pub values: Vec<f64>,
}

impl OutputTensor {
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Self {
        Self { shape, values }
    }

    /// Rank-0 tensor holding one value
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Vec::new(),
            values: vec![value],
        }
    }
}

/// Engine capable of opening model sessions
pub trait InferenceRuntime {
    type Session: ModelSession;

    /// Load a model and build a session for it
    fn load(&self, model_path: &Path) -> Result<Self::Session>;
}

/// One loaded model
pub trait ModelSession {
    /// Name and shape of the first declared input
    fn input_contract(&self) -> Result<InputContract>;

    /// Run a forward pass with `row` bound to `input_name` as a `[1, N]` f32
    /// tensor, returning the first output
    fn run(&mut self, input_name: &str, row: Vec<f32>) -> Result<OutputTensor>;
}
