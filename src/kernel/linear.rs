//! Linear kernel function

use crate::core::SparseVector;
use crate::kernel::KernelFunction;

/// Linear kernel: K(x, y) = x^T * y
///
/// The only function here that supports LINADD: a weighted support set
/// collapses into a single normal vector w = Σ α_i x_i.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Linear {
    pub fn new() -> Self {
        Self
    }
}

impl KernelFunction for Linear {
    fn name(&self) -> &str {
        "linear"
    }

    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        dot_product_sparse(x, y)
    }

    fn is_linear(&self) -> bool {
        true
    }
}

/// Compute dot product between two sparse vectors
///
/// Since both vectors have sorted indices, we can compute this efficiently
/// using a merge-like algorithm in O(nnz(x) + nnz(y)) time.
pub(crate) fn dot_product_sparse(x: &SparseVector, y: &SparseVector) -> f64 {
    let mut result = 0.0;
    let mut i = 0;
    let mut j = 0;

    while i < x.indices.len() && j < y.indices.len() {
        let x_idx = x.indices[i];
        let y_idx = y.indices[j];

        if x_idx == y_idx {
            result += x.values[i] * y.values[j];
            i += 1;
            j += 1;
        } else if x_idx < y_idx {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}
