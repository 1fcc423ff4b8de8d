//! Model serialization and persistence
//!
//! A saved model is a kernel description plus the support set, so it can be
//! re-bound to any pair of training/test feature sets at load time.

use crate::core::{KernelError, Result};
use crate::features::Features;
use crate::kernel::KernelConfig;
use crate::machine::SVM;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Serializable representation of a trained kernel SVM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel to rebuild at load time
    pub kernel: KernelConfig,
    /// Support vector indices into the training features
    pub support_vectors: Vec<usize>,
    /// Alpha values times labels (alpha_i * y_i)
    pub alphas: Vec<f64>,
    /// Bias term
    pub bias: f64,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl SerializableModel {
    /// Create a model, checking that every support vector has a coefficient
    pub fn new(
        kernel: KernelConfig,
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

        let n_support_vectors = support_vectors.len();
        Ok(Self {
            kernel,
            support_vectors,
            alphas,
            bias,
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        })
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(KernelError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        let reader = BufReader::new(file);
        let model: Self = serde_json::from_reader(reader)
            .map_err(|e| KernelError::SerializationError(e.to_string()))?;

        if model.support_vectors.len() != model.alphas.len() {
            return Err(KernelError::SizeMismatch {
                expected: model.support_vectors.len(),
                actual: model.alphas.len(),
            });
        }
        Ok(model)
    }

    /// Build the kernel, bind it to `train` × `test` and wrap it in an SVM
    ///
    /// Support vector indices must address vectors of `train`.
    pub fn into_svm(self, train: Arc<dyn Features>, test: Arc<dyn Features>) -> Result<SVM> {
        let len = train.num_vectors();
        if let Some(&index) = self.support_vectors.iter().find(|&&i| i >= len) {
            return Err(KernelError::IndexOutOfRange { index, len });
        }

        let kernel = self.kernel.build_shared()?;
        {
            let mut guard = kernel.write().map_err(|_| KernelError::LockPoisoned)?;
            debug!(
                "binding {} kernel to {} x {} vectors",
                guard.name(),
                len,
                test.num_vectors()
            );
            guard.init(train, test, true)?;
        }

        SVM::new(kernel, self.support_vectors, self.alphas, self.bias)
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== Kernel Model Summary ===");
        println!("Kernel: {}", kernel_description(&self.kernel));
        println!("Feature Slots: {}", self.kernel.num_slots());
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Bias: {:.6}", self.bias);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
    }
}

fn kernel_description(config: &KernelConfig) -> String {
    match config {
        KernelConfig::Linear { .. } => "linear".to_string(),
        KernelConfig::Rbf { gamma, .. } => format!("rbf (gamma={gamma})"),
        KernelConfig::Polynomial {
            degree,
            gamma,
            coef0,
            ..
        } => format!("polynomial (degree={degree}, gamma={gamma}, coef0={coef0})"),
        KernelConfig::Combined { kernels, .. } => {
            let parts: Vec<String> = kernels
                .iter()
                .map(|sub| format!("{}*{}", sub.weight, kernel_description(&sub.kernel)))
                .collect();
            format!("combined [{}]", parts.join(", "))
        }
    }
}
