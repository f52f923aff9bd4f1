//! Score extraction from model output
//!
//! Binary classifiers export either a bare probability, a `[1, 1]` tensor,
//! or a `[1, 2]` `[negative, positive]` distribution. The output is squeezed
//! and the positive class (index 1) is taken when there are two or more
//! entries along the first remaining axis.

use crate::models::runtime::OutputTensor;
use crate::types::result::clamp_score;
use anyhow::{anyhow, bail, Result};

/// Index of the positive class in a multi-class distribution
pub const POSITIVE_CLASS: usize = 1;

/// Reduce an output tensor to one raw (unclamped) score
pub fn extract_raw_score(output: &OutputTensor) -> Result<f64> {
    let element_count: usize = output.shape.iter().product();
    if element_count != output.values.len() {
        bail!(
            "Output shape {:?} does not match {} values",
            output.shape,
            output.values.len()
        );
    }

    let squeezed: Vec<usize> = output.shape.iter().copied().filter(|&d| d != 1).collect();

    let Some(&first) = squeezed.first() else {
        // rank 0 after squeeze: exactly one value
        return Ok(output.values[0]);
    };

    let index = if first >= 2 { POSITIVE_CLASS } else { 0 };
    if index >= first {
        bail!("Output shape {:?} has no element at index {}", output.shape, index);
    }

    // Row-major: each slice along the first axis spans the trailing dims
    let stride: usize = squeezed[1..].iter().product();
    if stride != 1 {
        return Err(anyhow!(
            "Output shape {:?} does not reduce to a single score",
            output.shape
        ));
    }

    Ok(output.values[index])
}

/// Reduce an output tensor to a score in [0, 1]
pub fn extract_score(output: &OutputTensor) -> Result<f64> {
    extract_raw_score(output).map(clamp_score)
}
