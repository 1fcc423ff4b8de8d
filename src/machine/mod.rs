//! Kernel machines: classifiers driven by a single shared kernel
//!
//! A [`KernelMachine`] holds the kernel and batch-classifies every vector on
//! the kernel's right-hand side. The per-example score comes from an
//! [`ExampleScorer`], implemented by concrete machines such as [`SVM`].

pub mod svm;

pub use self::svm::*;

use log::debug;

use crate::core::{KernelError, Labels, Result};
use crate::kernel::{Kernel, SharedKernel};

/// Per-example scoring hook consumed by [`KernelMachine::classify`]
pub trait ExampleScorer {
    /// Score right-hand vector `idx` with the already-locked `kernel`
    fn classify_example(&self, kernel: &dyn Kernel, idx: usize) -> Result<f64>;
}

/// Kernel handle plus evaluation-strategy switches
#[derive(Clone)]
pub struct KernelMachine {
    kernel: Option<SharedKernel>,
    use_batch_computation: bool,
    use_linadd: bool,
}

impl KernelMachine {
    /// Create a machine without a kernel; both strategies are enabled
    pub fn new() -> Self {
        Self {
            kernel: None,
            use_batch_computation: true,
            use_linadd: true,
        }
    }

    pub fn with_kernel(kernel: SharedKernel) -> Self {
        Self {
            kernel: Some(kernel),
            ..Self::new()
        }
    }

    pub fn set_kernel(&mut self, kernel: Option<SharedKernel>) {
        self.kernel = kernel;
    }

    pub fn kernel(&self) -> Option<&SharedKernel> {
        self.kernel.as_ref()
    }

    pub fn use_batch_computation(&self) -> bool {
        self.use_batch_computation
    }

    pub fn set_batch_computation_enabled(&mut self, enabled: bool) {
        self.use_batch_computation = enabled;
    }

    pub fn use_linadd(&self) -> bool {
        self.use_linadd
    }

    pub fn set_linadd_enabled(&mut self, enabled: bool) {
        self.use_linadd = enabled;
    }

    /// Score every right-hand vector of the bound kernel in index order
    ///
    /// Fails with `InvalidState` when no kernel or no features are bound or
    /// the right-hand side is empty, and with `SizeMismatch` when `output`
    /// does not hold exactly one slot per right-hand vector.
    pub fn classify<S>(&self, scorer: &S, output: Option<Labels>) -> Result<Labels>
    where
        S: ExampleScorer + ?Sized,
    {
        let shared = self
            .kernel
            .as_ref()
            .ok_or_else(|| KernelError::InvalidState("no kernel assigned".to_string()))?;
        let kernel = shared.read().map_err(|_| KernelError::LockPoisoned)?;

        let rhs = match (kernel.has_features(), kernel.rhs()) {
            (true, Some(rhs)) => rhs,
            _ => {
                return Err(KernelError::InvalidState(
                    "kernel has no features bound".to_string(),
                ))
            }
        };

        let num = rhs.num_vectors();
        if num == 0 {
            return Err(KernelError::InvalidState(
                "no vectors to classify".to_string(),
            ));
        }

        let mut output = match output {
            Some(labels) if labels.len() != num => {
                return Err(KernelError::SizeMismatch {
                    expected: num,
                    actual: labels.len(),
                })
            }
            Some(labels) => labels,
            None => Labels::new(num),
        };

        debug!("classifying {num} examples with {} kernel", kernel.name());
        for i in 0..num {
            output.set_label(i, scorer.classify_example(&*kernel, i)?);
        }

        Ok(output)
    }
}

impl Default for KernelMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KernelMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelMachine")
            .field("has_kernel", &self.kernel.is_some())
            .field("use_batch_computation", &self.use_batch_computation)
            .field("use_linadd", &self.use_linadd)
            .finish()
    }
}
