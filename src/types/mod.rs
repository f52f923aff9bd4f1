//! Type definitions for the scoring runner

pub mod json;
pub mod payload;
pub mod result;
pub mod uid;

pub use payload::FeaturePayload;
pub use result::{Reason, ScoreResult};
