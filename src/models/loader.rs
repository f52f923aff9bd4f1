//! ONNX Runtime backend

use crate::config::{OptimizationLevel, RunnerConfig};
use crate::models::runtime::{InferenceRuntime, InputContract, ModelSession, OutputTensor};
use anyhow::{anyhow, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::tensor::PrimitiveTensorElementType;
use ort::value::{DynValue, Tensor};
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

impl From<OptimizationLevel> for GraphOptimizationLevel {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Disable => GraphOptimizationLevel::Disable,
            OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
            OptimizationLevel::Extended => GraphOptimizationLevel::Level2,
            OptimizationLevel::All => GraphOptimizationLevel::Level3,
        }
    }
}

/// Acquired ONNX Runtime environment
pub struct OrtRuntime {
    /// Number of intra-op threads per session
    intra_threads: usize,
    /// Graph optimization level per session
    optimization: OptimizationLevel,
}

impl OrtRuntime {
    /// Acquire the ONNX Runtime capability.
    ///
    /// Fails when the runtime library cannot be initialized; nothing else
    /// in the process should touch `ort` if this fails. A dynamically loaded
    /// runtime panics when its library is missing, so that is caught too.
    pub fn acquire(config: &RunnerConfig) -> Result<Self> {
        let committed =
            std::panic::catch_unwind(|| ort::init().with_name("infer-runner").commit())
                .map_err(|_| anyhow!("ONNX Runtime library could not be loaded"))?;
        committed.context("Failed to initialize ONNX Runtime")?;

        info!(
            intra_threads = config.intra_threads,
            optimization = ?config.optimization,
            "ONNX Runtime initialized"
        );

        Ok(Self {
            intra_threads: config.intra_threads,
            optimization: config.optimization,
        })
    }
}

impl InferenceRuntime for OrtRuntime {
    type Session = OrtSession;

    fn load(&self, model_path: &Path) -> Result<OrtSession> {
        debug!(path = %model_path.display(), threads = self.intra_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(self.optimization.into())?
            .with_intra_threads(self.intra_threads)?
            .commit_from_file(model_path)
            .context(format!("Failed to load model from {:?}", model_path))?;

        Ok(OrtSession { session })
    }
}

/// Loaded ONNX model session (CPU execution provider)
pub struct OrtSession {
    session: Session,
}

impl ModelSession for OrtSession {
    fn input_contract(&self) -> Result<InputContract> {
        let input = self
            .session
            .inputs
            .first()
            .ok_or_else(|| anyhow!("Model declares no inputs"))?;

        let dims = input
            .input_type
            .tensor_shape()
            .ok_or_else(|| anyhow!("Input {:?} is not a tensor", input.name))?;

        Ok(InputContract {
            name: input.name.clone(),
            shape: contract_shape(dims),
        })
    }

    fn run(&mut self, input_name: &str, row: Vec<f32>) -> Result<OutputTensor> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, row.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, row)).context("Failed to create input tensor")?;

        let outputs = self
            .session
            .run(ort::inputs![input_name => input_tensor])
            .context("Inference run failed")?;

        first_output(&outputs)
    }
}

/// Map declared input dims to the contract shape.
///
/// ONNX Runtime reports symbolic and dynamic dimensions as -1.
fn contract_shape(dims: &[i64]) -> Vec<Option<i64>> {
    dims.iter().map(|&d| (d >= 0).then_some(d)).collect()
}

/// Extract the first output as a numeric tensor
fn first_output(outputs: &SessionOutputs) -> Result<OutputTensor> {
    let (name, output) = outputs
        .iter()
        .next()
        .ok_or_else(|| anyhow!("Model produced no outputs"))?;

    let tensor = output_tensor(&output).with_context(|| format!("Output {:?}", name))?;
    debug!(output = %name, shape = ?tensor.shape, "Extracted output tensor");

    Ok(tensor)
}

/// Read a numeric or bool tensor, widening every element to f64
fn output_tensor(value: &DynValue) -> Result<OutputTensor> {
    let (dims, values) = widened::<f32>(value, f64::from)
        .or_else(|| widened::<f64>(value, |v| v))
        .or_else(|| widened::<i64>(value, |v| v as f64))
        .or_else(|| widened::<i32>(value, f64::from))
        .or_else(|| widened::<i16>(value, f64::from))
        .or_else(|| widened::<i8>(value, f64::from))
        .or_else(|| widened::<u64>(value, |v| v as f64))
        .or_else(|| widened::<u32>(value, f64::from))
        .or_else(|| widened::<u16>(value, f64::from))
        .or_else(|| widened::<u8>(value, f64::from))
        .or_else(|| widened::<bool>(value, |v| if v { 1.0 } else { 0.0 }))
        .ok_or_else(|| anyhow!("not a numeric tensor ({:?})", value.dtype()))?;

    let shape = dims
        .into_iter()
        .map(|d| usize::try_from(d).context("Negative output dimension"))
        .collect::<Result<Vec<_>>>()?;

    Ok(OutputTensor::new(shape, values))
}

fn widened<T>(value: &DynValue, widen: fn(T) -> f64) -> Option<(Vec<i64>, Vec<f64>)>
where
    T: PrimitiveTensorElementType + Copy + Debug,
{
    let (shape, data) = value.try_extract_tensor::<T>().ok()?;
    Some((
        shape.iter().copied().collect(),
        data.iter().map(|&v| widen(v)).collect(),
    ))
}
