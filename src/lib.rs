//! Combined kernels for kernel machines
//!
//! A [`CombinedKernel`] evaluates a weighted sum of sub-kernels, each bound to
//! its own slot of a [`CombinedFeatures`] object, and supports LINADD
//! evaluation of `Σ α_i K(sv_i, x)` for fast classification with [`SVM`].

pub mod cache;
pub mod core;
pub mod data;
pub mod features;
pub mod kernel;
pub mod machine;
pub mod persistence;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::error::{KernelError, Result};
pub use crate::core::types::*;
pub use crate::data::LibSVMDataset;
pub use crate::features::{CombinedFeatures, FeatureClass, Features, SparseFeatures};
pub use crate::kernel::{
    shared, CombinedKernel, Kernel, KernelConfig, KernelList, LinearKernel, Pairing,
    SharedKernel,
};
pub use crate::machine::{ExampleScorer, KernelMachine, SVM};
pub use crate::persistence::SerializableModel;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
