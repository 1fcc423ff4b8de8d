//! RBF (Radial Basis Function) kernel function
//!
//! K(x, y) = exp(-γ * ||x - y||²), where γ controls the kernel width.

use crate::core::SparseVector;
use crate::kernel::linear::dot_product_sparse;
use crate::kernel::KernelFunction;

/// RBF kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// - High gamma: close points have high influence
/// - Low gamma: distant points have influence
#[derive(Debug, Clone, Copy)]
pub struct Rbf {
    gamma: f64,
}

impl Rbf {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Create RBF kernel with gamma = 1.0 / n_features
    pub fn with_auto_gamma(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for Rbf {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl KernelFunction for Rbf {
    fn name(&self) -> &str {
        "rbf"
    }

    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        let squared_distance = compute_squared_euclidean_distance(x, y);
        (-self.gamma * squared_distance).exp()
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        // ||x - y||² = ||x||² + ||y||² - 2*x^T*y
        let dot_product = dot_product_sparse(x, y);
        let squared_distance = (x_norm_sq + y_norm_sq - 2.0 * dot_product).max(0.0);

        (-self.gamma * squared_distance).exp()
    }
}

/// Compute squared Euclidean distance between two sparse vectors
fn compute_squared_euclidean_distance(x: &SparseVector, y: &SparseVector) -> f64 {
    let mut distance_sq = 0.0;
    let mut i = 0;
    let mut j = 0;

    while i < x.indices.len() && j < y.indices.len() {
        let x_idx = x.indices[i];
        let y_idx = y.indices[j];

        if x_idx == y_idx {
            let diff = x.values[i] - y.values[j];
            distance_sq += diff * diff;
            i += 1;
            j += 1;
        } else if x_idx < y_idx {
            distance_sq += x.values[i] * x.values[i];
            i += 1;
        } else {
            distance_sq += y.values[j] * y.values[j];
            j += 1;
        }
    }

    distance_sq += x.values[i..].iter().map(|v| v * v).sum::<f64>();
    distance_sq += y.values[j..].iter().map(|v| v * v).sum::<f64>();

    distance_sq
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rbf_kernel_creation() {
        assert_eq!(Rbf::new(0.5).gamma(), 0.5);
        assert_eq!(Rbf::with_auto_gamma(10).gamma(), 0.1);
        assert_eq!(Rbf::default().gamma(), 1.0);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_invalid_gamma() {
        Rbf::new(-0.5);
    }

    #[test]
    fn test_rbf_kernel_identical_vectors() {
        let kernel = Rbf::new(1.0);
        let x = SparseVector::new(vec![0, 1, 2], vec![1.0, 2.0, 3.0]);

        assert_relative_eq!(kernel.compute(&x, &x), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_rbf_kernel_orthogonal_vectors() {
        let kernel = Rbf::new(1.0);
        let x = SparseVector::new(vec![0, 2], vec![1.0, 1.0]);
        let y = SparseVector::new(vec![1, 3], vec![1.0, 1.0]);

        // ||x - y||² = 4 (no overlap)
        assert_relative_eq!(kernel.compute(&x, &y), (-4.0_f64).exp(), epsilon = 1e-10);
        assert!(!kernel.is_linear());
    }

    #[test]
    fn test_rbf_kernel_with_norms() {
        let kernel = Rbf::new(2.0);
        let x = SparseVector::new(vec![0, 1], vec![3.0, 4.0]);
        let y = SparseVector::new(vec![0, 1], vec![1.0, 2.0]);

        let plain = kernel.compute(&x, &y);
        let with_norms = kernel.compute_with_norms(&x, &y, x.norm_squared(), y.norm_squared());

        assert_relative_eq!(plain, with_norms, epsilon = 1e-10);
    }

    #[test]
    fn test_squared_euclidean_distance() {
        let x = SparseVector::new(vec![0, 2, 5], vec![1.0, 3.0, 2.0]);
        let y = SparseVector::new(vec![2, 3, 5], vec![2.0, 1.0, 4.0]);

        // 1 + 1 + 1 + 4
        assert_eq!(compute_squared_euclidean_distance(&x, &y), 7.0);
    }

    #[test]
    fn test_squared_euclidean_distance_empty() {
        let x = SparseVector::empty();
        let y = SparseVector::new(vec![0, 1], vec![1.0, 2.0]);

        assert_eq!(compute_squared_euclidean_distance(&x, &y), 5.0);
        assert_eq!(compute_squared_euclidean_distance(&y, &x), 5.0);
    }
}
