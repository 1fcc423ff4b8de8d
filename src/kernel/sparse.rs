//! Index-addressed kernel over sparse feature sets
//!
//! [`SparseKernel`] adapts any [`KernelFunction`] to the [`Kernel`]
//! capability: it binds two [`SparseFeatures`] sets, evaluates K(lhs[i],
//! rhs[j]) through an optional LRU cache and, for linear functions, keeps a
//! dense normal vector for LINADD evaluation.

use std::sync::Arc;

use log::debug;

use crate::cache::SharedKernelCache;
use crate::core::{KernelError, Result};
use crate::features::{same_features, FeatureClass, Features, SparseFeatures};
use crate::kernel::{Kernel, KernelFunction, Linear, Polynomial, Rbf};

pub type LinearKernel = SparseKernel<Linear>;
pub type RbfKernel = SparseKernel<Rbf>;
pub type PolynomialKernel = SparseKernel<Polynomial>;

/// Kernel evaluating a similarity function over two sparse feature sets
#[derive(Debug)]
pub struct SparseKernel<F: KernelFunction> {
    function: F,
    lhs: Option<Arc<SparseFeatures>>,
    rhs: Option<Arc<SparseFeatures>>,
    lhs_norms: Vec<f64>,
    rhs_norms: Vec<f64>,
    symmetric: bool,
    cache: SharedKernelCache,
    combined_weight: f64,
    /// LINADD state: w = Σ α_i lhs[i]
    normal: Option<Vec<f64>>,
}

impl<F: KernelFunction> SparseKernel<F> {
    /// Create an unbound kernel without a cache
    pub fn new(function: F) -> Self {
        Self {
            function,
            lhs: None,
            rhs: None,
            lhs_norms: Vec::new(),
            rhs_norms: Vec::new(),
            symmetric: false,
            cache: SharedKernelCache::disabled(),
            combined_weight: 1.0,
            normal: None,
        }
    }

    /// Cache up to `entries` kernel values (0 disables caching)
    pub fn with_cache_size(mut self, entries: usize) -> Self {
        self.cache = SharedKernelCache::new(entries);
        self
    }

    /// Set the initial combination weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.combined_weight = weight;
        self
    }

    pub fn function(&self) -> &F {
        &self.function
    }

    pub fn cache(&self) -> &SharedKernelCache {
        &self.cache
    }

    fn downcast(features: Arc<dyn Features>, side: &str) -> Result<Arc<SparseFeatures>> {
        let class = features.feature_class();
        if class != FeatureClass::Sparse {
            return Err(KernelError::TypeMismatch(format!(
                "{side} features must be sparse, got {class}"
            )));
        }
        features.into_any().downcast::<SparseFeatures>().map_err(|_| {
            KernelError::TypeMismatch(format!("{side} features are not SparseFeatures"))
        })
    }

    fn bound_lhs(&self) -> Result<&SparseFeatures> {
        self.lhs
            .as_deref()
            .ok_or_else(|| KernelError::FeaturesNotBound(format!("{} lhs", self.name())))
    }

    fn bound_rhs(&self) -> Result<&SparseFeatures> {
        self.rhs
            .as_deref()
            .ok_or_else(|| KernelError::FeaturesNotBound(format!("{} rhs", self.name())))
    }

    fn evaluate(&self, i: usize, j: usize) -> Result<f64> {
        let x = self.bound_lhs()?.vector(i)?;
        let y = self.bound_rhs()?.vector(j)?;

        match (self.lhs_norms.get(i), self.rhs_norms.get(j)) {
            (Some(&x_norm), Some(&y_norm)) => {
                Ok(self.function.compute_with_norms(x, y, x_norm, y_norm))
            }
            _ => Ok(self.function.compute(x, y)),
        }
    }

    fn empty_normal(&self) -> Result<Vec<f64>> {
        Ok(vec![0.0; self.bound_lhs()?.dimension()])
    }
}

impl<F: KernelFunction> Kernel for SparseKernel<F> {
    fn name(&self) -> &str {
        self.function.name()
    }

    fn init(
        &mut self,
        lhs: Arc<dyn Features>,
        rhs: Arc<dyn Features>,
        do_init: bool,
    ) -> Result<()> {
        // The normal vector was built from the previous lhs
        self.delete_optimization();

        let symmetric = same_features(&lhs, &rhs);
        let lhs = Self::downcast(lhs, "left")?;
        let rhs = Self::downcast(rhs, "right")?;

        if do_init {
            self.lhs_norms = lhs.squared_norms();
            self.rhs_norms = if symmetric {
                self.lhs_norms.clone()
            } else {
                rhs.squared_norms()
            };
        } else {
            self.lhs_norms.clear();
            self.rhs_norms.clear();
        }

        self.lhs = Some(lhs);
        self.rhs = Some(rhs);
        self.symmetric = symmetric;
        self.cache.reset(symmetric);
        Ok(())
    }

    fn lhs(&self) -> Option<Arc<dyn Features>> {
        self.lhs.clone().map(|f| f as Arc<dyn Features>)
    }

    fn rhs(&self) -> Option<Arc<dyn Features>> {
        self.rhs.clone().map(|f| f as Arc<dyn Features>)
    }

    fn remove_lhs(&mut self) {
        self.delete_optimization();
        if self.lhs.is_some() {
            self.cache.reset(false);
        }
        self.lhs = None;
        self.lhs_norms.clear();
    }

    fn remove_rhs(&mut self) {
        self.delete_optimization();
        if self.rhs.is_some() {
            self.cache.reset(false);
        }
        self.rhs = None;
        self.rhs_norms.clear();
    }

    fn cleanup(&mut self) {
        self.delete_optimization();
        self.cache.reset(self.symmetric);
    }

    fn kernel(&self, i: usize, j: usize) -> Result<f64> {
        self.cache.get_or_compute(i, j, || self.evaluate(i, j))
    }

    fn is_optimizable(&self) -> bool {
        self.function.is_linear()
    }

    fn is_initialized(&self) -> bool {
        self.normal.is_some()
    }

    fn init_optimization(&mut self, indices: &[usize], weights: &[f64]) -> Result<()> {
        if !self.is_optimizable() {
            return Err(KernelError::NotOptimizable(self.name().to_string()));
        }
        if indices.len() != weights.len() {
            return Err(KernelError::SizeMismatch {
                expected: indices.len(),
                actual: weights.len(),
            });
        }

        self.delete_optimization();

        let lhs = self.bound_lhs()?;
        let mut normal = self.empty_normal()?;
        for (&idx, &weight) in indices.iter().zip(weights) {
            lhs.vector(idx)?.add_scaled_to(&mut normal, weight);
        }

        debug!(
            "{} kernel: normal vector of dimension {} from {} support vectors",
            self.name(),
            normal.len(),
            indices.len()
        );
        self.normal = Some(normal);
        Ok(())
    }

    fn delete_optimization(&mut self) {
        self.normal = None;
    }

    fn compute_optimized(&self, idx: usize) -> Result<f64> {
        let normal = self.normal.as_ref().ok_or(KernelError::NotInitialized)?;
        Ok(self.bound_rhs()?.vector(idx)?.dot_dense(normal))
    }

    fn add_to_normal(&mut self, idx: usize, weight: f64) -> Result<()> {
        if !self.is_optimizable() {
            return Err(KernelError::NotOptimizable(self.name().to_string()));
        }

        let mut normal = match self.normal.take() {
            Some(normal) => normal,
            None => self.empty_normal()?,
        };
        let result = self
            .bound_lhs()
            .and_then(|lhs| lhs.vector(idx))
            .map(|x| x.add_scaled_to(&mut normal, weight));
        self.normal = Some(normal);
        result
    }

    fn clear_normal(&mut self) {
        if let Some(normal) = self.normal.as_mut() {
            normal.iter_mut().for_each(|w| *w = 0.0);
        }
    }

    fn combined_kernel_weight(&self) -> f64 {
        self.combined_weight
    }

    fn set_combined_kernel_weight(&mut self, weight: f64) {
        self.combined_weight = weight;
    }

    fn subkernel_weights(&mut self) -> &[f64] {
        std::slice::from_ref(&self.combined_weight)
    }

    fn set_subkernel_weights(&mut self, weights: &[f64]) -> Result<()> {
        match weights {
            [weight] => {
                self.combined_weight = *weight;
                Ok(())
            }
            _ => Err(KernelError::SizeMismatch {
                expected: 1,
                actual: weights.len(),
            }),
        }
    }
}
