//! ML model inference components

pub mod extractor;
pub mod inference;
pub mod loader;
pub mod runtime;

pub use inference::InferenceEngine;
pub use loader::OrtRuntime;
pub use runtime::{InferenceRuntime, InputContract, ModelSession, OutputTensor};
