//! Error types for kernel evaluation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Number of features/kernels does not match: {kernels} kernels, {left} left slots, {right} right slots")]
    CountMismatch {
        kernels: usize,
        left: usize,
        right: usize,
    },

    #[error("Initialising sub-kernel {position} ({kernel}) failed: {source}")]
    DelegateInitFailure {
        position: usize,
        kernel: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Kernel optimization not initialized")]
    NotInitialized,

    #[error("Kernel is not optimizable: {0}")]
    NotOptimizable(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Features not bound: {0}")]
    FeaturesNotBound(String),

    #[error("Index {index} out of range for {len} vectors")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Kernel lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KernelError>;
