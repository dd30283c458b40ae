//! # powderopt
//!
//! Economically optimal virgin/recycled powder mixing ratios for
//! powder-bed-fusion additive manufacturing.
//!
//! The numerical core is a discrete-time Markov chain model of powder
//! aging with a closed-form steady-state solver, a bisection search
//! for the minimal virgin-powder fraction satisfying quality and
//! degradation constraints, and an annual cost comparison against two
//! fixed industry reference strategies.
//!
//! ## Example
//!
//! ```rust
//! use powderopt::prelude::*;
//!
//! let optimizer = RefreshOptimizer::with_defaults(PowderAgingModel::pa12());
//! let result = optimizer.optimize(0.29)?;
//! assert!(result.converged);
//! # Ok::<(), powderopt::PowderError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::suboptimal_flops,  // Numerical code choices are intentional
    clippy::imprecise_flops,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::needless_range_loop,   // Sometimes range loops are clearer
    clippy::manual_midpoint,       // Manual midpoint is intentional in numerical code
)]

pub mod cli;
pub mod config;
pub mod economics;
pub mod error;
pub mod linalg;
pub mod markov;
pub mod optimizer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{validate_parameters, SiteConfig, SiteConfigBuilder};
    pub use crate::economics::{evaluate_economics, EconomicsResult};
    pub use crate::error::{PowderError, PowderResult};
    pub use crate::markov::{PowderAgingModel, StatusDistribution};
    pub use crate::optimizer::{OptimizationResult, OptimizerConfig, RefreshOptimizer};
}

/// Re-export for public API
pub use error::{PowderError, PowderResult};
