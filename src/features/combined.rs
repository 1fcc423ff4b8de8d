//! Combined features: one feature set per sub-kernel slot

use std::any::Any;
use std::sync::Arc;

use crate::core::{KernelError, Result};
use crate::features::{FeatureClass, Features};

/// Ordered collection of heterogeneous feature sets describing the same examples
///
/// Slot `i` is paired with sub-kernel `i` of a combined kernel. Every slot
/// must hold the same number of vectors.
#[derive(Debug, Default)]
pub struct CombinedFeatures {
    feature_objs: Vec<Arc<dyn Features>>,
}

impl CombinedFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature set at the tail
    ///
    /// Fails with `SizeMismatch` when its vector count differs from the
    /// slots already present.
    pub fn append_feature_obj(&mut self, features: Arc<dyn Features>) -> Result<()> {
        if let Some(first) = self.feature_objs.first() {
            let expected = first.num_vectors();
            let actual = features.num_vectors();
            if expected != actual {
                return Err(KernelError::SizeMismatch { expected, actual });
            }
        }
        self.feature_objs.push(features);
        Ok(())
    }

    /// Builder-style variant of `append_feature_obj`
    pub fn with_feature_obj(mut self, features: Arc<dyn Features>) -> Result<Self> {
        self.append_feature_obj(features)?;
        Ok(self)
    }

    pub fn num_feature_obj(&self) -> usize {
        self.feature_objs.len()
    }

    pub fn feature_objs(&self) -> &[Arc<dyn Features>] {
        &self.feature_objs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Features>> {
        self.feature_objs.iter()
    }
}

impl Features for CombinedFeatures {
    fn feature_class(&self) -> FeatureClass {
        FeatureClass::Combined
    }

    fn num_vectors(&self) -> usize {
        self.feature_objs.first().map_or(0, |f| f.num_vectors())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use crate::features::SparseFeatures;

    fn sparse(n: usize) -> Arc<dyn Features> {
        Arc::new(SparseFeatures::new(vec![SparseVector::empty(); n]))
    }

    #[test]
    fn test_append_and_iterate() {
        let combined = CombinedFeatures::new()
            .with_feature_obj(sparse(3))
            .and_then(|c| c.with_feature_obj(sparse(3)))
            .unwrap();

        assert_eq!(combined.num_feature_obj(), 2);
        assert_eq!(combined.num_vectors(), 3);
        assert_eq!(combined.feature_class(), FeatureClass::Combined);
        assert_eq!(combined.iter().count(), 2);
    }

    #[test]
    fn test_append_rejects_vector_count_mismatch() {
        let mut combined = CombinedFeatures::new();
        combined.append_feature_obj(sparse(3)).unwrap();

        let err = combined.append_feature_obj(sparse(2)).unwrap_err();
        assert!(matches!(
            err,
            KernelError::SizeMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(combined.num_feature_obj(), 1);
    }

    #[test]
    fn test_empty_combined_features() {
        let combined = CombinedFeatures::new();
        assert_eq!(combined.num_vectors(), 0);
        assert_eq!(combined.num_feature_obj(), 0);
    }
}
