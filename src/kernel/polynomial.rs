//! Polynomial kernel function
//!
//! K(x, y) = (γ * <x, y> + r)^d
//!
//! Common configurations:
//! - Quadratic kernel: d=2, γ=1, r=1
//! - Cubic kernel: d=3, γ=1, r=1

use crate::core::SparseVector;
use crate::kernel::linear::dot_product_sparse;
use crate::kernel::KernelFunction;

/// Polynomial kernel with configurable degree, gamma, and coefficient
#[derive(Debug, Clone)]
pub struct Polynomial {
    /// Scaling factor for the dot product
    pub gamma: f64,
    /// Independent term in the polynomial
    pub coef0: f64,
    /// Degree of the polynomial
    pub degree: u32,
}

impl Polynomial {
    /// Creates a new polynomial kernel
    ///
    /// # Examples
    /// ```
    /// use kernmix::kernel::Polynomial;
    ///
    /// // Quadratic kernel: (x·y + 1)²
    /// let quad = Polynomial::new(2, 1.0, 1.0);
    /// assert_eq!(quad.degree, 2);
    /// ```
    ///
    /// # Panics
    /// Panics if `degree` is zero or `gamma` is not positive
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Self {
        assert!(degree > 0, "Polynomial degree must be positive");
        assert!(gamma > 0.0, "Gamma must be positive");

        Self {
            gamma,
            coef0,
            degree,
        }
    }

    /// Creates a quadratic kernel: (γ * <x,y> + 1)²
    pub fn quadratic(gamma: f64) -> Self {
        Self::new(2, gamma, 1.0)
    }
}

impl KernelFunction for Polynomial {
    fn name(&self) -> &str {
        "polynomial"
    }

    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        let base = self.gamma * dot_product_sparse(x, y) + self.coef0;

        // Non-positive bases map to zero
        if base <= 0.0 {
            0.0
        } else {
            base.powi(self.degree as i32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_kernel() {
        let kernel = Polynomial::quadratic(2.0);
        assert_eq!(kernel.degree, 2);
        assert_eq!(kernel.gamma, 2.0);
        assert_eq!(kernel.coef0, 1.0);
    }

    #[test]
    fn test_polynomial_kernel_computation() {
        let kernel = Polynomial::new(2, 1.0, 1.0);

        let x = SparseVector::new(vec![0, 1], vec![1.0, 2.0]);
        let y = SparseVector::new(vec![0, 1], vec![2.0, 1.0]);

        // (1.0 * 4 + 1.0)²
        assert_relative_eq!(kernel.compute(&x, &y), 25.0, epsilon = 1e-10);
    }

    #[test]
    fn test_polynomial_kernel_same_vector() {
        let kernel = Polynomial::new(3, 0.5, 2.0);
        let x = SparseVector::new(vec![0, 1], vec![3.0, 4.0]);

        // (0.5 * 25 + 2.0)³
        assert_relative_eq!(kernel.compute(&x, &x), 3048.625, epsilon = 1e-10);
    }

    #[test]
    fn test_polynomial_negative_base_clamped() {
        let kernel = Polynomial::new(3, 1.0, 0.0);
        let x = SparseVector::new(vec![0], vec![1.0]);
        let y = SparseVector::new(vec![0], vec![-1.0]);

        assert_eq!(kernel.compute(&x, &y), 0.0);
    }

    #[test]
    #[should_panic(expected = "Polynomial degree must be positive")]
    fn test_polynomial_zero_degree() {
        Polynomial::new(0, 1.0, 1.0);
    }
}
