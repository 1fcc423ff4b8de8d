//! Data loading
//!
//! Readers that turn on-disk datasets into feature objects.

pub mod libsvm;

pub use self::libsvm::*;
