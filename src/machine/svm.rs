//! Support vector machine scorer
//!
//! f(x) = Σ_i α_i K(sv_i, x) + b, with α_i already carrying the label sign.
//! Training is out of scope: the support set comes from elsewhere, e.g. a
//! saved model.

use log::debug;

use crate::core::{KernelError, Labels, Prediction, Result};
use crate::kernel::{Kernel, SharedKernel};
use crate::machine::{ExampleScorer, KernelMachine};

/// A trained SVM evaluated through a shared kernel
#[derive(Debug, Clone)]
pub struct SVM {
    machine: KernelMachine,
    support_vectors: Vec<usize>,
    alphas: Vec<f64>,
    bias: f64,
}

impl SVM {
    /// Create an SVM from support-vector indices (into the kernel's lhs),
    /// signed coefficients and a bias
    pub fn new(
        kernel: SharedKernel,
        support_vectors: Vec<usize>,
        alphas: Vec<f64>,
        bias: f64,
    ) -> Result<Self> {
        if support_vectors.len() != alphas.len() {
            return Err(KernelError::SizeMismatch {
                expected: support_vectors.len(),
                actual: alphas.len(),
            });
        }

        Ok(Self {
            machine: KernelMachine::with_kernel(kernel),
            support_vectors,
            alphas,
            bias,
        })
    }

    pub fn machine(&self) -> &KernelMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut KernelMachine {
        &mut self.machine
    }

    pub fn support_vectors(&self) -> &[usize] {
        &self.support_vectors
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn shared_kernel(&self) -> Result<&SharedKernel> {
        self.machine
            .kernel()
            .ok_or_else(|| KernelError::InvalidState("no kernel assigned".to_string()))
    }

    /// Install LINADD state for this SVM's support set in the kernel
    pub fn init_kernel_optimization(&self) -> Result<()> {
        let mut kernel = self
            .shared_kernel()?
            .write()
            .map_err(|_| KernelError::LockPoisoned)?;
        debug!(
            "initializing {} kernel optimization with {} support vectors",
            kernel.name(),
            self.support_vectors.len()
        );
        kernel.init_optimization(&self.support_vectors, &self.alphas)
    }

    pub fn delete_kernel_optimization(&self) -> Result<()> {
        let mut kernel = self
            .shared_kernel()?
            .write()
            .map_err(|_| KernelError::LockPoisoned)?;
        kernel.delete_optimization();
        Ok(())
    }

    /// Decision values for every right-hand vector of the kernel
    pub fn classify(&self, output: Option<Labels>) -> Result<Labels> {
        self.machine.classify(self, output)
    }

    /// Thresholded predictions for every right-hand vector of the kernel
    pub fn predict(&self) -> Result<Vec<Prediction>> {
        Ok(self.classify(None)?.predictions())
    }
}

impl ExampleScorer for SVM {
    fn classify_example(&self, kernel: &dyn Kernel, idx: usize) -> Result<f64> {
        let score = if self.machine.use_linadd() && kernel.is_initialized() {
            kernel.compute_optimized(idx)?
        } else {
            let mut sum = 0.0;
            for (&sv, &alpha) in self.support_vectors.iter().zip(self.alphas.iter()) {
                sum += alpha * kernel.kernel(sv, idx)?;
            }
            sum
        };

        Ok(score + self.bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use crate::features::{CombinedFeatures, Features, SparseFeatures};
    use crate::kernel::{shared, CombinedKernel, Linear, LinearKernel, Rbf, RbfKernel};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn slot(values: &[f64]) -> Arc<dyn Features> {
        Arc::new(SparseFeatures::new(
            values
                .iter()
                .map(|&v| SparseVector::new(vec![0, 1], vec![v, 1.0]))
                .collect(),
        ))
    }

    fn combined_kernel(train: Arc<dyn Features>, test: Arc<dyn Features>) -> SharedKernel {
        let mut kernel = CombinedKernel::new(false);
        kernel.append_kernel(Box::new(LinearKernel::new(Linear))).unwrap();
        kernel
            .append_kernel(Box::new(RbfKernel::new(Rbf::new(0.5)).with_weight(0.5)))
            .unwrap();
        kernel.init(train, test, true).unwrap();
        shared(kernel)
    }

    fn combined(slots: Vec<Arc<dyn Features>>) -> Arc<dyn Features> {
        let mut features = CombinedFeatures::new();
        for s in slots {
            features.append_feature_obj(s).unwrap();
        }
        Arc::new(features)
    }

    #[test]
    fn test_new_rejects_unequal_support_set() {
        let kernel = shared(LinearKernel::new(Linear));
        assert!(matches!(
            SVM::new(kernel, vec![0, 1], vec![1.0], 0.0),
            Err(KernelError::SizeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_linadd_and_exact_paths_agree() {
        let train = combined(vec![slot(&[2.0, -2.0, 1.5]), slot(&[1.0, -1.0, 0.5])]);
        let test = combined(vec![slot(&[1.0, -0.5, 3.0, 0.0]), slot(&[0.2, 0.1, -1.0, 0.0])]);
        let kernel = combined_kernel(train, test);

        let mut svm = SVM::new(kernel, vec![0, 1], vec![0.75, -0.75], 0.1).unwrap();
        let exact = svm.classify(None).unwrap();

        svm.init_kernel_optimization().unwrap();
        let optimized = svm.classify(None).unwrap();
        assert_eq!(optimized.len(), 4);
        for i in 0..4 {
            assert_relative_eq!(exact.label(i), optimized.label(i), epsilon = 1e-10);
        }

        // Switching LINADD off falls back to the exact sum even while installed
        svm.machine_mut().set_linadd_enabled(false);
        let forced = svm.classify(None).unwrap();
        assert_eq!(forced, exact);

        svm.delete_kernel_optimization().unwrap();
        let kernel = svm.machine().kernel().unwrap().read().unwrap();
        assert!(!kernel.is_initialized());
    }

    #[test]
    fn test_predict_thresholds_outputs() {
        let train = combined(vec![slot(&[2.0, -2.0]), slot(&[0.0, 0.0])]);
        let test = combined(vec![slot(&[3.0, -3.0]), slot(&[0.0, 0.0])]);
        let kernel = combined_kernel(train, test);

        let svm = SVM::new(kernel, vec![0, 1], vec![0.5, -0.5], 0.0).unwrap();
        let predictions = svm.predict().unwrap();
        assert_eq!(predictions[0].label, 1.0);
        assert_eq!(predictions[1].label, -1.0);
        assert_eq!(svm.n_support_vectors(), 2);
    }
}
