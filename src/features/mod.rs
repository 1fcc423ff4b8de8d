//! Feature sets that kernels bind to
//!
//! Kernels address examples by index into a left-hand and a right-hand
//! feature set. Concrete sets are shared through `Arc<dyn Features>`.

pub mod combined;
pub mod sparse;

pub use self::combined::*;
pub use self::sparse::*;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Storage class of a feature set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureClass {
    /// Sparse real-valued vectors
    Sparse,
    /// Ordered collection of heterogeneous feature sets
    Combined,
}

impl fmt::Display for FeatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureClass::Sparse => write!(f, "sparse"),
            FeatureClass::Combined => write!(f, "combined"),
        }
    }
}

/// A set of feature vectors addressable by index
pub trait Features: Send + Sync + fmt::Debug {
    /// Storage class, checked by kernels before binding
    fn feature_class(&self) -> FeatureClass;

    /// Number of vectors in the set
    fn num_vectors(&self) -> usize;

    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle for typed downcasting
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// True when both handles point at the same feature set
pub fn same_features(a: &Arc<dyn Features>, b: &Arc<dyn Features>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}
