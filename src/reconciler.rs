//! Feature vector shape reconciliation.
//!
//! Upstream feature producers may emit variable-length vectors while the
//! ONNX models expect a fixed width. Vectors are right-padded with zeros or
//! truncated to the model's declared width.

use crate::models::runtime::InputContract;

/// Pad or truncate `features` to `expected` elements.
///
/// Returns the input unchanged when the width is unknown.
pub fn reconcile(mut features: Vec<f64>, expected: Option<usize>) -> Vec<f64> {
    if let Some(width) = expected {
        // resize covers both directions: zero-pad short, drop the tail when long
        features.resize(width, 0.0);
    }
    features
}

impl InputContract {
    /// Expected feature count: the second dimension, when known and positive.
    pub fn expected_width(&self) -> Option<usize> {
        match self.shape.get(1) {
            Some(Some(dim)) if *dim > 0 => usize::try_from(*dim).ok(),
            _ => None,
        }
    }
}
