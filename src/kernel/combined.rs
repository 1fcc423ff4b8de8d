//! Combined kernel: a weighted sum of heterogeneous sub-kernels
//!
//! K(x, y) = Σ_k w_k K_k(x, y), where sub-kernel k is bound to feature slot k
//! of a pair of [`CombinedFeatures`]. Sub-kernels with weight zero are never
//! evaluated.
//!
//! LINADD evaluation is delegated to every sub-kernel that supports it. The
//! remaining sub-kernels are evaluated exactly against a copy of the support
//! set, so a mixed list still produces Σ_j α_j K(sv_j, idx).
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kernmix::core::SparseVector;
//! use kernmix::features::{CombinedFeatures, Features, SparseFeatures};
//! use kernmix::kernel::{CombinedKernel, Kernel, Linear, LinearKernel, Rbf, RbfKernel};
//!
//! # fn main() -> kernmix::core::Result<()> {
//! let words: Arc<dyn Features> = Arc::new(SparseFeatures::new(vec![
//!     SparseVector::new(vec![0], vec![1.0]),
//!     SparseVector::new(vec![1], vec![2.0]),
//! ]));
//! let shape: Arc<dyn Features> = Arc::new(SparseFeatures::new(vec![
//!     SparseVector::new(vec![0], vec![0.5]),
//!     SparseVector::new(vec![0], vec![1.5]),
//! ]));
//! let features: Arc<dyn Features> = Arc::new(
//!     CombinedFeatures::new()
//!         .with_feature_obj(words)?
//!         .with_feature_obj(shape)?,
//! );
//!
//! let mut kernel = CombinedKernel::new(false);
//! kernel.append_kernel(Box::new(LinearKernel::new(Linear)))?;
//! kernel.append_kernel(Box::new(RbfKernel::new(Rbf::new(1.0)).with_weight(0.5)))?;
//! kernel.init(Arc::clone(&features), features, true)?;
//!
//! // 1.0 * <w0, w0> + 0.5 * exp(0)
//! assert_eq!(kernel.kernel(0, 0)?, 1.5);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::cache::SharedKernelCache;
use crate::core::{KernelError, Result};
use crate::features::{same_features, CombinedFeatures, FeatureClass, Features};
use crate::kernel::{Kernel, KernelList};

/// How the right-hand feature slots relate to the left-hand ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Left and right are different collections
    Distinct,
    /// Left and right are the same collection; slot i pairs with itself
    SelfPaired,
}

/// Support set kept for sub-kernels that could not install LINADD state
#[derive(Debug, Clone, Default)]
struct SupportSet {
    indices: Vec<usize>,
    weights: Vec<f64>,
}

impl SupportSet {
    fn weighted_sum(&self, kernel: &dyn Kernel, idx: usize) -> Result<f64> {
        self.indices
            .iter()
            .zip(self.weights.iter())
            .map(|(&sv, &weight)| kernel.kernel(sv, idx).map(|k| weight * k))
            .sum()
    }
}

/// Weighted sum of sub-kernels over combined features
#[derive(Debug)]
pub struct CombinedKernel {
    kernels: KernelList,
    lhs: Option<Arc<dyn Features>>,
    rhs: Option<Arc<dyn Features>>,
    pairing: Pairing,
    /// Present only while some sub-kernel lacks LINADD state
    support: Option<SupportSet>,
    initialized: bool,
    append_subkernel_weights: bool,
    /// Reused by `subkernel_weights`
    weights_buffer: Vec<f64>,
    combined_weight: f64,
    cache: SharedKernelCache,
}

impl CombinedKernel {
    /// Create an empty combined kernel
    ///
    /// With `append_subkernel_weights` the weight vector is the concatenation
    /// of every sub-kernel's own weight vector; otherwise it holds one scalar
    /// per sub-kernel.
    pub fn new(append_subkernel_weights: bool) -> Self {
        info!("combined kernel created");
        if append_subkernel_weights {
            info!("(subkernel weights are appended)");
        }

        Self {
            kernels: KernelList::new(),
            lhs: None,
            rhs: None,
            pairing: Pairing::Distinct,
            support: None,
            initialized: false,
            append_subkernel_weights,
            weights_buffer: Vec::new(),
            combined_weight: 1.0,
            cache: SharedKernelCache::disabled(),
        }
    }

    /// Cache up to `entries` combined kernel values (0 disables caching)
    pub fn with_cache_size(mut self, entries: usize) -> Self {
        self.cache = SharedKernelCache::new(entries);
        self
    }

    /// Set the weight this kernel carries inside an enclosing combined kernel
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.combined_weight = weight;
        self
    }

    /// Append a sub-kernel at the tail of the list
    ///
    /// The list is frozen while features are bound, since slot pairing is
    /// positional; call `remove_lhs`/`remove_rhs` first.
    pub fn append_kernel(&mut self, kernel: Box<dyn Kernel>) -> Result<()> {
        if self.lhs.is_some() || self.rhs.is_some() {
            return Err(KernelError::InvalidState(
                "cannot append a sub-kernel while features are bound".to_string(),
            ));
        }
        self.kernels.append(kernel);
        Ok(())
    }

    pub fn num_kernels(&self) -> usize {
        self.kernels.len()
    }

    pub fn kernel_list(&self) -> &KernelList {
        &self.kernels
    }

    pub fn subkernel(&self, pos: usize) -> Option<&dyn Kernel> {
        self.kernels.get(pos)
    }

    /// Mutable access to sub-kernel `pos`
    ///
    /// Cached combined values are dropped, since the caller may change the
    /// sub-kernel's weight.
    pub fn subkernel_mut(&mut self, pos: usize) -> Option<&mut (dyn Kernel + 'static)> {
        self.invalidate_cache();
        self.kernels.get_mut(pos)
    }

    pub fn appends_subkernel_weights(&self) -> bool {
        self.append_subkernel_weights
    }

    /// Pairing resolved by the last successful type check in `init`
    pub fn pairing(&self) -> Pairing {
        self.pairing
    }

    /// Whether the exact-evaluation support set is in use
    pub fn has_fallback(&self) -> bool {
        self.support.is_some()
    }

    pub fn cache(&self) -> &SharedKernelCache {
        &self.cache
    }

    /// Log this kernel and every sub-kernel in list order
    pub fn list_kernels(&self) {
        info!(
            "BEGIN COMBINED KERNEL LIST - {} sub-kernels, weight {}",
            self.kernels.len(),
            self.combined_weight
        );
        for (pos, k) in self.kernels.iter().enumerate() {
            info!(
                "  {pos}: {} weight={} optimizable={} initialized={}",
                k.name(),
                k.combined_kernel_weight(),
                k.is_optimizable(),
                k.is_initialized()
            );
        }
        info!("END COMBINED KERNEL LIST");
    }

    /// Uncached Σ_k w_k K_k(x, y) over sub-kernels with non-zero weight
    pub fn compute(&self, x: usize, y: usize) -> Result<f64> {
        let mut result = 0.0;
        for k in self.kernels.iter() {
            let weight = k.combined_kernel_weight();
            if weight != 0.0 {
                result += weight * k.kernel(x, y)?;
            }
        }
        Ok(result)
    }

    /// Accumulate each sub-kernel's weighted LINADD output into `out`
    ///
    /// `out[i] += w_i * K_i(idx)` for every sub-kernel with non-zero weight;
    /// other slots are left untouched. Zeroing `out` beforehand is up to the
    /// caller.
    pub fn compute_by_subkernel(&self, idx: usize, out: &mut [f64]) -> Result<()> {
        if out.len() != self.kernels.len() {
            return Err(KernelError::SizeMismatch {
                expected: self.kernels.len(),
                actual: out.len(),
            });
        }
        if !self.initialized {
            return Err(KernelError::NotInitialized);
        }

        for (slot, k) in out.iter_mut().zip(self.kernels.iter()) {
            let weight = k.combined_kernel_weight();
            if weight != 0.0 {
                *slot += weight * self.optimized_output(k, idx)?;
            }
        }
        Ok(())
    }

    /// Unweighted LINADD output of one sub-kernel, falling back to the support set
    fn optimized_output(&self, kernel: &dyn Kernel, idx: usize) -> Result<f64> {
        if kernel.is_optimizable() && kernel.is_initialized() {
            return kernel.compute_optimized(idx);
        }
        match &self.support {
            Some(support) => support.weighted_sum(kernel, idx),
            // Every sub-kernel accepted the optimization; nothing to add
            None => Ok(0.0),
        }
    }

    fn invalidate_cache(&self) {
        self.cache.reset(self.pairing == Pairing::SelfPaired);
    }

    fn as_combined<'a>(features: &'a Arc<dyn Features>, side: &str) -> Result<&'a CombinedFeatures> {
        let class = features.feature_class();
        if class != FeatureClass::Combined {
            return Err(KernelError::TypeMismatch(format!(
                "{side} features must be combined, got {class}"
            )));
        }
        features
            .as_any()
            .downcast_ref::<CombinedFeatures>()
            .ok_or_else(|| {
                KernelError::TypeMismatch(format!("{side} features are not CombinedFeatures"))
            })
    }
}

impl Kernel for CombinedKernel {
    fn name(&self) -> &str {
        "combined"
    }

    fn init(
        &mut self,
        lhs: Arc<dyn Features>,
        rhs: Arc<dyn Features>,
        do_init: bool,
    ) -> Result<()> {
        // LINADD state refers to the previous lhs
        self.delete_optimization();

        let pairing = if same_features(&lhs, &rhs) {
            Pairing::SelfPaired
        } else {
            Pairing::Distinct
        };

        let left = Self::as_combined(&lhs, "left")?;
        let right = match pairing {
            Pairing::SelfPaired => left,
            Pairing::Distinct => Self::as_combined(&rhs, "right")?,
        };

        self.lhs = Some(Arc::clone(&lhs));
        self.rhs = Some(Arc::clone(&rhs));
        self.pairing = pairing;
        self.cache.reset(pairing == Pairing::SelfPaired);

        let left_slots = left.feature_objs();
        let right_slots = right.feature_objs();

        let slots = left_slots.iter().zip(right_slots.iter());
        for (position, (kernel, (l, r))) in self.kernels.iter_mut().zip(slots).enumerate() {
            if let Err(source) = kernel.init(Arc::clone(l), Arc::clone(r), do_init) {
                error!(
                    "CombinedKernel: initialising sub-kernel {position} ({}) failed: {source}",
                    kernel.name()
                );
                return Err(KernelError::DelegateInitFailure {
                    position,
                    kernel: kernel.name().to_string(),
                    source: Box::new(source),
                });
            }
        }

        let kernels = self.kernels.len();
        if kernels != left_slots.len() || kernels != right_slots.len() {
            error!(
                "CombinedKernel: number of features/kernels does not match ({kernels} kernels, {} left, {} right)",
                left_slots.len(),
                right_slots.len()
            );
            return Err(KernelError::CountMismatch {
                kernels,
                left: left_slots.len(),
                right: right_slots.len(),
            });
        }

        Ok(())
    }

    fn lhs(&self) -> Option<Arc<dyn Features>> {
        self.lhs.clone()
    }

    fn rhs(&self) -> Option<Arc<dyn Features>> {
        self.rhs.clone()
    }

    fn remove_lhs(&mut self) {
        self.delete_optimization();
        if self.lhs.take().is_some() {
            self.cache.reset(false);
        }
        for k in self.kernels.iter_mut() {
            k.remove_lhs();
        }
    }

    fn remove_rhs(&mut self) {
        self.delete_optimization();
        if self.rhs.take().is_some() {
            self.cache.reset(false);
        }
        for k in self.kernels.iter_mut() {
            k.remove_rhs();
        }
    }

    fn cleanup(&mut self) {
        for k in self.kernels.iter_mut() {
            k.cleanup();
        }
        self.delete_optimization();
        self.cache.reset(self.pairing == Pairing::SelfPaired);
    }

    fn kernel(&self, i: usize, j: usize) -> Result<f64> {
        self.cache.get_or_compute(i, j, || self.compute(i, j))
    }

    fn is_optimizable(&self) -> bool {
        true
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn init_optimization(&mut self, indices: &[usize], weights: &[f64]) -> Result<()> {
        if indices.len() != weights.len() {
            return Err(KernelError::SizeMismatch {
                expected: indices.len(),
                actual: weights.len(),
            });
        }

        debug!("initializing CombinedKernel optimization");
        self.delete_optimization();

        let mut have_non_optimizable = false;
        for (pos, k) in self.kernels.iter_mut().enumerate() {
            if !k.is_optimizable() {
                warn!("non-optimizable sub-kernel {pos} ({}) in kernel list", k.name());
                have_non_optimizable = true;
            } else if let Err(e) = k.init_optimization(indices, weights) {
                warn!("init_optimization of sub-kernel {pos} ({}) failed: {e}", k.name());
                have_non_optimizable = true;
            }
        }

        if have_non_optimizable {
            warn!(
                "some kernels in the kernel list are not optimized; keeping {} support vectors",
                indices.len()
            );
            self.support = Some(SupportSet {
                indices: indices.to_vec(),
                weights: weights.to_vec(),
            });
        }
        self.initialized = true;
        Ok(())
    }

    fn delete_optimization(&mut self) {
        for k in self.kernels.iter_mut() {
            k.delete_optimization();
        }
        self.support = None;
        self.initialized = false;
    }

    fn compute_optimized(&self, idx: usize) -> Result<f64> {
        if !self.initialized {
            error!("CombinedKernel optimization not initialized");
            return Err(KernelError::NotInitialized);
        }

        let mut result = 0.0;
        for k in self.kernels.iter() {
            let weight = k.combined_kernel_weight();
            if weight != 0.0 {
                result += weight * self.optimized_output(k, idx)?;
            }
        }
        Ok(result)
    }

    fn add_to_normal(&mut self, idx: usize, weight: f64) -> Result<()> {
        if !self.initialized {
            return self.init_optimization(&[idx], &[weight]);
        }

        // Reject bad indices before any sub-kernel is touched
        let len = self
            .lhs
            .as_ref()
            .ok_or_else(|| KernelError::FeaturesNotBound("combined lhs".to_string()))?
            .num_vectors();
        if idx >= len {
            return Err(KernelError::IndexOutOfRange { index: idx, len });
        }

        // Sub-kernels without LINADD state are served by the support set
        let result = self
            .kernels
            .iter_mut()
            .enumerate()
            .filter(|(_, k)| k.is_optimizable() && k.is_initialized())
            .try_for_each(|(pos, k)| {
                k.add_to_normal(idx, weight).map_err(|e| {
                    error!("add_to_normal of sub-kernel {pos} ({}) failed: {e}", k.name());
                    e
                })
            });
        if let Err(e) = result {
            self.delete_optimization();
            return Err(e);
        }
        if let Some(support) = self.support.as_mut() {
            support.indices.push(idx);
            support.weights.push(weight);
        }
        Ok(())
    }

    fn clear_normal(&mut self) {
        for k in self.kernels.iter_mut() {
            k.clear_normal();
        }
        if let Some(support) = self.support.as_mut() {
            support.indices.clear();
            support.weights.clear();
        }
    }

    fn combined_kernel_weight(&self) -> f64 {
        self.combined_weight
    }

    fn set_combined_kernel_weight(&mut self, weight: f64) {
        self.combined_weight = weight;
        self.invalidate_cache();
    }

    fn num_subkernels(&self) -> usize {
        if self.append_subkernel_weights {
            self.kernels.iter().map(|k| k.num_subkernels()).sum()
        } else {
            self.kernels.len()
        }
    }

    fn subkernel_weights(&mut self) -> &[f64] {
        self.weights_buffer.clear();

        if self.append_subkernel_weights {
            for k in self.kernels.iter_mut() {
                let expected = k.num_subkernels();
                let weights = k.subkernel_weights();
                debug_assert_eq!(weights.len(), expected);
                self.weights_buffer.extend_from_slice(weights);
            }
        } else {
            self.weights_buffer
                .extend(self.kernels.iter().map(|k| k.combined_kernel_weight()));
        }

        &self.weights_buffer
    }

    fn set_subkernel_weights(&mut self, weights: &[f64]) -> Result<()> {
        let expected = self.num_subkernels();
        if weights.len() != expected {
            return Err(KernelError::SizeMismatch {
                expected,
                actual: weights.len(),
            });
        }

        if self.append_subkernel_weights {
            let mut offset = 0;
            let mut failure = None;
            for k in self.kernels.iter_mut() {
                let num = k.num_subkernels();
                let slice = &weights[offset..offset + num];
                if let Err(e) = k.set_subkernel_weights(slice) {
                    failure = Some(e);
                    break;
                }

                // A sub-kernel is switched on iff any of its own weights is non-zero
                let on = slice.iter().any(|&w| w != 0.0);
                k.set_combined_kernel_weight(if on { 1.0 } else { 0.0 });
                offset += num;
            }
            if let Some(e) = failure {
                self.invalidate_cache();
                return Err(e);
            }
        } else {
            for (k, &w) in self.kernels.iter_mut().zip(weights) {
                k.set_combined_kernel_weight(w);
            }
        }
        self.invalidate_cache();
        Ok(())
    }
}

impl Drop for CombinedKernel {
    fn drop(&mut self) {
        debug!("combined kernel deleted");
        self.cleanup();
    }
}
