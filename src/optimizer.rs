//! Bisection search for the minimal sustainable refresh ratio.
//!
//! Finds the smallest virgin-powder fraction `alpha` whose steady-state
//! stock distribution satisfies both the quality threshold and the
//! degraded-fraction limit. The search interval is `[rho, 1.0]`: the
//! packing density `rho` is the proven lower bound for sustainable
//! continuous operation, since each build consumes `rho` times the
//! chamber volume of fresh capacity and any smaller virgin input
//! depletes the stock.
//!
//! # Monotonicity precondition
//!
//! Bisection is only correct because the quality index is
//! non-decreasing and the degraded fraction non-increasing in `alpha`
//! for the calibrated PA12 constants. This is assumed, not re-verified
//! at runtime; swapping in a different transition matrix or weight
//! vector requires re-validating it (or replacing the search with a
//! full scan), otherwise the search silently converges to a wrong
//! boundary.

use serde::{Deserialize, Serialize};

use crate::error::{PowderError, PowderResult};
use crate::markov::{PowderAgingModel, StatusDistribution};

/// Constraint and termination settings for the refresh-ratio search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Minimum acceptable quality index `Q_min`.
    pub quality_threshold: f64,
    /// Maximum acceptable degraded stock fraction `epsilon`.
    pub degraded_limit: f64,
    /// Bisection interval width at which the search stops.
    pub tolerance: f64,
    /// Iteration cap; the search returns its best bracket on hitting it.
    pub max_iterations: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 0.60,
            degraded_limit: 0.12,
            tolerance: 0.001,
            max_iterations: 50,
        }
    }
}

/// Outcome of one refresh-ratio optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Minimal feasible refresh ratio found, in `(0, 1]`.
    pub optimal_ratio: f64,
    /// Steady-state distribution at `optimal_ratio`.
    pub distribution: StatusDistribution,
    /// Quality index at `optimal_ratio`.
    pub quality_index: f64,
    /// Degraded stock fraction at `optimal_ratio`.
    pub degraded_fraction: f64,
    /// Bisection iterations performed.
    pub iterations: usize,
    /// Whether the interval shrank below tolerance before the cap.
    ///
    /// `false` is a degraded-confidence result, not an error: the best
    /// bracket found is still returned.
    pub converged: bool,
    /// Whether `optimal_ratio` satisfies both constraints.
    ///
    /// `false` means even fully virgin powder failed the constraints
    /// and the returned ratio is the best achievable, not a feasible
    /// one.
    pub feasible: bool,
    /// Whether the result sits at the packing-density lower bound
    /// (within tolerance), i.e. the sustainability constraint is the
    /// active one rather than quality or degradation.
    pub floor_active: bool,
}

/// Bisection optimizer over the refresh ratio.
#[derive(Debug, Clone)]
pub struct RefreshOptimizer {
    model: PowderAgingModel,
    config: OptimizerConfig,
}

impl RefreshOptimizer {
    /// Create an optimizer for the given model and settings.
    #[must_use]
    pub const fn new(model: PowderAgingModel, config: OptimizerConfig) -> Self {
        Self { model, config }
    }

    /// Create an optimizer with default constraint settings.
    #[must_use]
    pub fn with_defaults(model: PowderAgingModel) -> Self {
        Self::new(model, OptimizerConfig::default())
    }

    /// The active settings.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// The underlying aging model.
    #[must_use]
    pub const fn model(&self) -> &PowderAgingModel {
        &self.model
    }

    /// Find the minimal refresh ratio satisfying the constraints.
    ///
    /// Bisects `alpha` over `[packing_density, 1.0]`: a feasible
    /// midpoint becomes the new upper bound (search for a smaller
    /// feasible ratio), an infeasible one becomes the new lower bound.
    /// The result is the upper bound after loop exit, re-evaluated once
    /// for the final report. If even `alpha = 1.0` fails the
    /// constraints the search returns 1.0 with `feasible == false`;
    /// callers should inspect `feasible` and `converged` rather than
    /// assume the returned ratio meets the thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`PowderError::InvalidInput`] if `packing_density` lies
    /// outside `(0, 1]`. Kernel errors propagate unchanged; they
    /// cannot occur for the fixed PA12 constants.
    pub fn optimize(&self, packing_density: f64) -> PowderResult<OptimizationResult> {
        if !(packing_density > 0.0 && packing_density <= 1.0) {
            return Err(PowderError::invalid_input(format!(
                "packing density must lie in (0, 1], got {packing_density}"
            )));
        }

        let mut lo = packing_density;
        let mut hi = 1.0;
        let mut iterations = 0;

        while (hi - lo) > self.config.tolerance && iterations < self.config.max_iterations {
            let mid = (lo + hi) / 2.0;
            let pi = self.model.steady_state(mid)?;
            if self.satisfies_constraints(&pi) {
                hi = mid;
            } else {
                lo = mid;
            }
            iterations += 1;
        }

        let distribution = self.model.steady_state(hi)?;
        let quality_index = self.model.quality_index(&distribution);
        let degraded_fraction = distribution.degraded_fraction();

        Ok(OptimizationResult {
            optimal_ratio: hi,
            distribution,
            quality_index,
            degraded_fraction,
            iterations,
            converged: iterations < self.config.max_iterations,
            feasible: self.satisfies_constraints(&distribution),
            floor_active: (hi - packing_density) <= self.config.tolerance,
        })
    }

    fn satisfies_constraints(&self, pi: &StatusDistribution) -> bool {
        self.model.quality_index(pi) >= self.config.quality_threshold
            && pi.degraded_fraction() <= self.config.degraded_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_optimizer() -> RefreshOptimizer {
        RefreshOptimizer::with_defaults(PowderAgingModel::pa12())
    }

    #[test]
    fn test_optimize_converges_at_fuse1_packing_density() {
        let result = default_optimizer().optimize(0.29).expect("valid input");
        assert!(result.converged);
        assert!(result.iterations < 50);
        assert!(result.optimal_ratio >= 0.29 && result.optimal_ratio <= 1.0);
        assert!(result.feasible);
    }

    #[test]
    fn test_sustainability_floor_active_at_fuse1() {
        // alpha = 0.29 already satisfies both constraints (Q ~ 0.770,
        // degraded ~ 0.088), so the search pins against the packing
        // density and the floor is the active constraint.
        let result = default_optimizer().optimize(0.29).expect("valid input");
        assert!(result.floor_active);
        assert!((result.optimal_ratio - 0.29).abs() <= 0.001);
        assert!(result.quality_index >= 0.60);
        assert!(result.degraded_fraction <= 0.12);
    }

    #[test]
    fn test_constraint_driven_result_above_floor() {
        // At rho = 0.10 the floor itself is infeasible (Q ~ 0.47); the
        // binding constraint is quality and the result lands near 0.247.
        let result = default_optimizer().optimize(0.10).expect("valid input");
        assert!(result.converged);
        assert!(!result.floor_active);
        assert!(result.feasible);
        assert!((result.optimal_ratio - 0.247).abs() < 0.01);
    }

    #[test]
    fn test_infeasible_constraints_return_fully_virgin() {
        let config = OptimizerConfig {
            quality_threshold: 0.95,
            degraded_limit: 0.001,
            ..OptimizerConfig::default()
        };
        let optimizer = RefreshOptimizer::new(PowderAgingModel::pa12(), config);
        let result = optimizer.optimize(0.29).expect("valid input");
        // Even fully virgin powder scores Q = 0.949 < 0.95; the search
        // still returns 1.0 as the best achievable ratio.
        assert!((result.optimal_ratio - 1.0).abs() < f64::EPSILON);
        assert!(!result.feasible);
    }

    #[test]
    fn test_iteration_cap_reported_as_not_converged() {
        let config = OptimizerConfig {
            tolerance: 1e-12,
            max_iterations: 5,
            ..OptimizerConfig::default()
        };
        let optimizer = RefreshOptimizer::new(PowderAgingModel::pa12(), config);
        let result = optimizer.optimize(0.10).expect("valid input");
        assert!(!result.converged);
        assert_eq!(result.iterations, 5);
        // The bracket result is still usable.
        assert!(result.optimal_ratio >= 0.10 && result.optimal_ratio <= 1.0);
    }

    #[test]
    fn test_result_is_reevaluated_at_final_ratio() {
        let result = default_optimizer().optimize(0.13).expect("valid input");
        let model = PowderAgingModel::pa12();
        let pi = model
            .steady_state(result.optimal_ratio)
            .expect("ratio in range");
        assert!((result.quality_index - model.quality_index(&pi)).abs() < 1e-12);
        assert!((result.degraded_fraction - pi.degraded_fraction()).abs() < 1e-12);
    }

    #[test]
    fn test_optimize_rejects_out_of_range_density() {
        let optimizer = default_optimizer();
        for rho in [0.0, -0.2, 1.5] {
            assert!(matches!(
                optimizer.optimize(rho),
                Err(crate::error::PowderError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_degenerate_interval_at_full_density() {
        // rho = 1.0 collapses the interval; no bisection steps run.
        let result = default_optimizer().optimize(1.0).expect("valid input");
        assert_eq!(result.iterations, 0);
        assert!(result.converged);
        assert!((result.optimal_ratio - 1.0).abs() < f64::EPSILON);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Falsification: the returned ratio always lies in the search
        /// interval and the iteration count respects the cap.
        #[test]
        fn prop_result_within_bracket(rho in 0.01f64..1.0) {
            let result = RefreshOptimizer::with_defaults(PowderAgingModel::pa12())
                .optimize(rho)
                .expect("rho in range");
            prop_assert!(result.optimal_ratio >= rho);
            prop_assert!(result.optimal_ratio <= 1.0);
            prop_assert!(result.iterations <= 50);
        }

        /// Falsification: a converged feasible result cannot be beaten
        /// by more than the tolerance (no feasible ratio exists more
        /// than one tolerance below it).
        #[test]
        fn prop_minimality_up_to_tolerance(rho in 0.05f64..0.4) {
            let optimizer = RefreshOptimizer::with_defaults(PowderAgingModel::pa12());
            let result = optimizer.optimize(rho).expect("rho in range");
            if result.converged && result.feasible && !result.floor_active {
                let probe = result.optimal_ratio - 2.0 * optimizer.config().tolerance;
                prop_assume!(probe > 0.0);
                let model = PowderAgingModel::pa12();
                let pi = model.steady_state(probe).expect("probe in range");
                let feasible_below = model.quality_index(&pi) >= 0.60
                    && pi.degraded_fraction() <= 0.12;
                prop_assert!(!feasible_below, "found feasible ratio {probe} below result");
            }
        }
    }
}
