//! Core type definitions shared by features, kernels and machines

/// Prediction derived from a classifier output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Build a prediction from a raw output, thresholding at zero
    pub fn from_output(decision_value: f64) -> Self {
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Self::new(label, decision_value)
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Compute L2 norm
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Smallest dense length able to hold every stored index
    pub fn dimension(&self) -> usize {
        self.indices.last().map_or(0, |&idx| idx + 1)
    }

    /// Dot product against a dense vector; indices past its end count as zero
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(self.values.iter())
            .filter_map(|(&idx, &v)| dense.get(idx).map(|&d| d * v))
            .sum()
    }

    /// Accumulate `scale * self` into a dense vector, growing it if needed
    pub fn add_scaled_to(&self, dense: &mut Vec<f64>, scale: f64) {
        let dim = self.dimension();
        if dense.len() < dim {
            dense.resize(dim, 0.0);
        }
        for (&idx, &v) in self.indices.iter().zip(self.values.iter()) {
            dense[idx] += scale * v;
        }
    }
}

/// Per-example classifier outputs, indexed like the right-hand feature set
#[derive(Clone, Debug, PartialEq)]
pub struct Labels {
    values: Vec<f64>,
}

impl Labels {
    /// Create `n` zero-valued labels
    pub fn new(n: usize) -> Self {
        Self {
            values: vec![0.0; n],
        }
    }

    /// Wrap existing label values
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the label at `i`
    ///
    /// # Panics
    /// Panics if `i >= len()`
    pub fn label(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Set the label at `i`
    ///
    /// # Panics
    /// Panics if `i >= len()`
    pub fn set_label(&mut self, i: usize, value: f64) {
        self.values[i] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Interpret every value as a decision value
    pub fn predictions(&self) -> Vec<Prediction> {
        self.values
            .iter()
            .map(|&v| Prediction::from_output(v))
            .collect()
    }
}
