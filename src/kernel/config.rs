//! Declarative kernel configuration
//!
//! Kernels are described as JSON and built into boxed [`Kernel`]s:
//!
//! ```json
//! {
//!   "type": "combined",
//!   "append_subkernel_weights": false,
//!   "kernels": [
//!     { "weight": 1.0, "kernel": { "type": "linear" } },
//!     { "weight": 0.5, "kernel": { "type": "rbf", "gamma": 0.1, "cache_size": 10000 } }
//!   ]
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{KernelError, Result};
use crate::kernel::{
    shared, CombinedKernel, Kernel, Linear, LinearKernel, Polynomial, PolynomialKernel, Rbf,
    RbfKernel, SharedKernel,
};

/// Kernel description; `cache_size` is a number of cached entries, 0 disables it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelConfig {
    Linear {
        #[serde(default)]
        cache_size: usize,
    },
    Rbf {
        gamma: f64,
        #[serde(default)]
        cache_size: usize,
    },
    Polynomial {
        degree: u32,
        #[serde(default = "default_one")]
        gamma: f64,
        #[serde(default = "default_one")]
        coef0: f64,
        #[serde(default)]
        cache_size: usize,
    },
    Combined {
        #[serde(default)]
        append_subkernel_weights: bool,
        kernels: Vec<SubKernelConfig>,
        #[serde(default)]
        cache_size: usize,
    },
}

/// A sub-kernel together with its combination weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubKernelConfig {
    #[serde(default = "default_one")]
    pub weight: f64,
    pub kernel: KernelConfig,
}

fn default_one() -> f64 {
    1.0
}

impl KernelConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| KernelError::SerializationError(e.to_string()))
    }

    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| KernelError::SerializationError(e.to_string()))
    }

    /// Number of feature slots a kernel built from this config consumes
    pub fn num_slots(&self) -> usize {
        match self {
            KernelConfig::Combined { kernels, .. } => kernels.len(),
            _ => 1,
        }
    }

    /// Validate parameters and build the kernel
    pub fn build(&self) -> Result<Box<dyn Kernel>> {
        Ok(self.build_concrete()?.boxed())
    }

    /// Validate parameters and build the kernel behind a shared handle
    pub fn build_shared(&self) -> Result<SharedKernel> {
        Ok(self.build_concrete()?.shared())
    }

    fn build_concrete(&self) -> Result<BuiltKernel> {
        match self {
            KernelConfig::Linear { cache_size } => Ok(BuiltKernel::Linear(
                LinearKernel::new(Linear).with_cache_size(*cache_size),
            )),
            KernelConfig::Rbf { gamma, cache_size } => {
                check_positive("gamma", *gamma)?;
                Ok(BuiltKernel::Rbf(
                    RbfKernel::new(Rbf::new(*gamma)).with_cache_size(*cache_size),
                ))
            }
            KernelConfig::Polynomial {
                degree,
                gamma,
                coef0,
                cache_size,
            } => {
                if *degree == 0 {
                    return Err(KernelError::InvalidParameter(
                        "Polynomial degree must be positive".to_string(),
                    ));
                }
                check_positive("gamma", *gamma)?;
                if !coef0.is_finite() {
                    return Err(KernelError::InvalidParameter(format!(
                        "coef0 must be finite, got: {coef0}"
                    )));
                }
                Ok(BuiltKernel::Polynomial(
                    PolynomialKernel::new(Polynomial::new(*degree, *gamma, *coef0))
                        .with_cache_size(*cache_size),
                ))
            }
            KernelConfig::Combined {
                append_subkernel_weights,
                kernels,
                cache_size,
            } => {
                let mut combined =
                    CombinedKernel::new(*append_subkernel_weights).with_cache_size(*cache_size);
                for sub in kernels {
                    if !sub.weight.is_finite() {
                        return Err(KernelError::InvalidParameter(format!(
                            "Sub-kernel weight must be finite, got: {}",
                            sub.weight
                        )));
                    }
                    let mut kernel = sub.kernel.build()?;
                    kernel.set_combined_kernel_weight(sub.weight);
                    combined.append_kernel(kernel)?;
                }
                Ok(BuiltKernel::Combined(combined))
            }
        }
    }
}

/// Concrete kernel produced from a config, before choosing its ownership
enum BuiltKernel {
    Linear(LinearKernel),
    Rbf(RbfKernel),
    Polynomial(PolynomialKernel),
    Combined(CombinedKernel),
}

impl BuiltKernel {
    fn boxed(self) -> Box<dyn Kernel> {
        match self {
            BuiltKernel::Linear(k) => Box::new(k),
            BuiltKernel::Rbf(k) => Box::new(k),
            BuiltKernel::Polynomial(k) => Box::new(k),
            BuiltKernel::Combined(k) => Box::new(k),
        }
    }

    fn shared(self) -> SharedKernel {
        match self {
            BuiltKernel::Linear(k) => shared(k),
            BuiltKernel::Rbf(k) => shared(k),
            BuiltKernel::Polynomial(k) => shared(k),
            BuiltKernel::Combined(k) => shared(k),
        }
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter(format!(
            "{name} must be positive, got: {value}"
        )))
    }
}
