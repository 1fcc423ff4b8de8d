//! Sparse real-valued feature vectors

use std::any::Any;
use std::sync::Arc;

use crate::core::{KernelError, Result, SparseVector};
use crate::features::{FeatureClass, Features};

/// A set of sparse vectors, typically loaded from a LibSVM file
#[derive(Debug, Clone, Default)]
pub struct SparseFeatures {
    vectors: Vec<SparseVector>,
    dimension: usize,
}

impl SparseFeatures {
    pub fn new(vectors: Vec<SparseVector>) -> Self {
        let dimension = vectors.iter().map(SparseVector::dimension).max().unwrap_or(0);
        Self { vectors, dimension }
    }

    /// Get vector `i`, failing with `IndexOutOfRange` past the end
    pub fn vector(&self, i: usize) -> Result<&SparseVector> {
        self.vectors.get(i).ok_or(KernelError::IndexOutOfRange {
            index: i,
            len: self.vectors.len(),
        })
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    /// Dense dimensionality (largest index + 1)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Squared norms of every vector, in order
    pub fn squared_norms(&self) -> Vec<f64> {
        self.vectors.iter().map(SparseVector::norm_squared).collect()
    }
}

impl Features for SparseFeatures {
    fn feature_class(&self) -> FeatureClass {
        FeatureClass::Sparse
    }

    fn num_vectors(&self) -> usize {
        self.vectors.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
