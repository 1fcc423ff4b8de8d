//! Kernel trait definitions
//!
//! Two levels of abstraction live here:
//!
//! * [`KernelFunction`] is a similarity function K(x, y) on a pair of sparse
//!   vectors (linear, RBF, polynomial).
//! * [`Kernel`] is an index-addressed kernel bound to a left-hand and a
//!   right-hand feature set. It is what combined kernels and kernel machines
//!   orchestrate, and it optionally supports LINADD evaluation: folding a
//!   weighted support set into a precomputed form so that
//!   `compute_optimized(idx)` equals `Σ_j w_j K(sv_j, idx)` without touching
//!   every support vector.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::core::{KernelError, Result, SparseVector};
use crate::features::Features;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
pub trait KernelFunction: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and configs
    fn name(&self) -> &str;

    /// Compute kernel value K(x, y)
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64;

    /// Optional: compute kernel value using precomputed squared norms
    /// This can be more efficient for some kernels (e.g., RBF)
    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        let _ = (x_norm_sq, y_norm_sq);
        self.compute(x, y)
    }

    /// Whether K(x, y) = <x, y>, so a support set folds into one normal vector
    fn is_linear(&self) -> bool {
        false
    }
}

/// Index-addressed kernel bound to a pair of feature sets
pub trait Kernel: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and diagnostics
    fn name(&self) -> &str;

    /// Bind the kernel to `lhs` and `rhs`
    ///
    /// With `do_init` set, per-kernel precomputation (norms, caches) is redone.
    fn init(&mut self, lhs: Arc<dyn Features>, rhs: Arc<dyn Features>, do_init: bool)
        -> Result<()>;

    /// Left-hand feature binding, if any
    fn lhs(&self) -> Option<Arc<dyn Features>>;

    /// Right-hand feature binding, if any
    fn rhs(&self) -> Option<Arc<dyn Features>>;

    fn has_features(&self) -> bool {
        self.lhs().is_some() && self.rhs().is_some()
    }

    /// Release the left-hand binding
    fn remove_lhs(&mut self);

    /// Release the right-hand binding
    fn remove_rhs(&mut self);

    /// Tear down internal state (optimization, caches) keeping the bindings
    fn cleanup(&mut self);

    /// Kernel value between lhs vector `i` and rhs vector `j`
    fn kernel(&self, i: usize, j: usize) -> Result<f64>;

    /// Whether this kernel implements LINADD evaluation
    fn is_optimizable(&self) -> bool {
        false
    }

    /// Whether LINADD state is currently installed
    fn is_initialized(&self) -> bool {
        false
    }

    /// Install LINADD state for the support set `indices` (into lhs) with `weights`
    fn init_optimization(&mut self, indices: &[usize], weights: &[f64]) -> Result<()> {
        let _ = (indices, weights);
        Err(KernelError::NotOptimizable(self.name().to_string()))
    }

    /// Drop LINADD state
    fn delete_optimization(&mut self) {}

    /// Σ_j w_j K(sv_j, idx) over the installed support set, `idx` into rhs
    fn compute_optimized(&self, idx: usize) -> Result<f64> {
        let _ = idx;
        Err(KernelError::NotOptimizable(self.name().to_string()))
    }

    /// Fold one more (lhs index, weight) pair into the LINADD state
    fn add_to_normal(&mut self, idx: usize, weight: f64) -> Result<()> {
        let _ = (idx, weight);
        Err(KernelError::NotOptimizable(self.name().to_string()))
    }

    /// Reset the LINADD state to zero without uninstalling it
    fn clear_normal(&mut self) {}

    /// Scalar weight applied by an enclosing combined kernel
    fn combined_kernel_weight(&self) -> f64;

    fn set_combined_kernel_weight(&mut self, weight: f64);

    /// Length of this kernel's sub-kernel weight vector
    fn num_subkernels(&self) -> usize {
        1
    }

    /// Sub-kernel weight vector; the slice is only valid until the next mutation
    fn subkernel_weights(&mut self) -> &[f64];

    fn set_subkernel_weights(&mut self, weights: &[f64]) -> Result<()>;

    /// Full lhs × rhs kernel matrix, row per lhs vector
    fn kernel_matrix(&self) -> Result<Vec<Vec<f64>>> {
        let (Some(lhs), Some(rhs)) = (self.lhs(), self.rhs()) else {
            return Err(KernelError::FeaturesNotBound(self.name().to_string()));
        };
        let cols = rhs.num_vectors();

        (0..lhs.num_vectors())
            .map(|i| (0..cols).map(|j| self.kernel(i, j)).collect::<Result<Vec<f64>>>())
            .collect()
    }
}

/// Kernel handle shared between a kernel machine and its callers
pub type SharedKernel = Arc<RwLock<dyn Kernel>>;

/// Wrap a kernel for sharing with a kernel machine
pub fn shared<K: Kernel + 'static>(kernel: K) -> SharedKernel {
    Arc::new(RwLock::new(kernel))
}
