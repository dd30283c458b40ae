//! Annual material cost comparison between refresh strategies.
//!
//! Pure arithmetic over the optimized refresh ratio and the site
//! parameters: virgin volume per build, mass per build, annual mass,
//! annual cost, plus savings against two fixed industry reference
//! strategies (30% vendor recommendation and 50% conservative
//! industrial practice).

use serde::{Deserialize, Serialize};

use crate::error::{PowderError, PowderResult};

/// PA12 powder density in kg per liter.
pub const POWDER_DENSITY_KG_PER_L: f64 = 0.47;

/// Vendor-recommended refresh ratio used as the first reference.
pub const VENDOR_REFERENCE_RATIO: f64 = 0.30;

/// Conservative industrial refresh ratio used as the second reference.
pub const INDUSTRIAL_REFERENCE_RATIO: f64 = 0.50;

/// Material consumption and cost of one refresh strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrategyEconomics {
    /// Refresh ratio the strategy runs at.
    pub refresh_ratio: f64,
    /// Virgin powder volume per build, liters.
    pub virgin_per_build_l: f64,
    /// Virgin powder mass per build, kg.
    pub mass_per_build_kg: f64,
    /// Annual virgin powder mass, kg.
    pub annual_mass_kg: f64,
    /// Annual virgin powder cost, in the caller's currency unit.
    pub annual_cost: f64,
}

impl StrategyEconomics {
    fn evaluate(ratio: f64, chamber_volume_l: f64, builds_per_year: u32, cost_per_kg: f64) -> Self {
        let virgin_per_build_l = ratio * chamber_volume_l;
        let mass_per_build_kg = virgin_per_build_l * POWDER_DENSITY_KG_PER_L;
        let annual_mass_kg = mass_per_build_kg * f64::from(builds_per_year);
        Self {
            refresh_ratio: ratio,
            virgin_per_build_l,
            mass_per_build_kg,
            annual_mass_kg,
            annual_cost: annual_mass_kg * cost_per_kg,
        }
    }
}

/// Savings of the optimized strategy against one reference strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Savings {
    /// Annual mass saved, kg. Negative if the optimized ratio is worse.
    pub mass_kg: f64,
    /// Annual cost saved.
    pub cost: f64,
    /// Cost saved as a percentage of the reference annual cost.
    pub percentage: f64,
}

impl Savings {
    fn between(reference: &StrategyEconomics, optimized: &StrategyEconomics) -> Self {
        Self {
            mass_kg: reference.annual_mass_kg - optimized.annual_mass_kg,
            cost: reference.annual_cost - optimized.annual_cost,
            percentage: (reference.annual_cost - optimized.annual_cost) / reference.annual_cost
                * 100.0,
        }
    }
}

/// Full cost comparison across the three strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsResult {
    /// Economics at the optimized ratio.
    pub optimized: StrategyEconomics,
    /// Economics at the 30% vendor reference.
    pub vendor_reference: StrategyEconomics,
    /// Economics at the 50% industrial reference.
    pub industrial_reference: StrategyEconomics,
    /// Savings of optimized vs. the vendor reference.
    pub savings_vs_vendor: Savings,
    /// Savings of optimized vs. the industrial reference.
    pub savings_vs_industrial: Savings,
}

/// Evaluate annual economics for the optimized ratio and both
/// references.
///
/// All site parameters must be strictly positive and the ratio must lie
/// in `(0, 1]`; this makes the reference annual costs positive, so the
/// percentage computation never divides by zero.
///
/// # Errors
///
/// Returns [`PowderError::InvalidInput`] for a non-positive chamber
/// volume, build count, or powder cost, or a ratio outside `(0, 1]`.
pub fn evaluate_economics(
    chamber_volume_l: f64,
    builds_per_year: u32,
    powder_cost_per_kg: f64,
    optimal_ratio: f64,
) -> PowderResult<EconomicsResult> {
    if !(chamber_volume_l.is_finite() && chamber_volume_l > 0.0) {
        return Err(PowderError::invalid_input(format!(
            "chamber volume must be positive, got {chamber_volume_l}"
        )));
    }
    if builds_per_year == 0 {
        return Err(PowderError::invalid_input(
            "builds per year must be at least 1",
        ));
    }
    if !(powder_cost_per_kg.is_finite() && powder_cost_per_kg > 0.0) {
        return Err(PowderError::invalid_input(format!(
            "powder cost must be positive, got {powder_cost_per_kg}"
        )));
    }
    if !(optimal_ratio > 0.0 && optimal_ratio <= 1.0) {
        return Err(PowderError::invalid_input(format!(
            "refresh ratio must lie in (0, 1], got {optimal_ratio}"
        )));
    }

    let optimized = StrategyEconomics::evaluate(
        optimal_ratio,
        chamber_volume_l,
        builds_per_year,
        powder_cost_per_kg,
    );
    let vendor_reference = StrategyEconomics::evaluate(
        VENDOR_REFERENCE_RATIO,
        chamber_volume_l,
        builds_per_year,
        powder_cost_per_kg,
    );
    let industrial_reference = StrategyEconomics::evaluate(
        INDUSTRIAL_REFERENCE_RATIO,
        chamber_volume_l,
        builds_per_year,
        powder_cost_per_kg,
    );
    let savings_vs_vendor = Savings::between(&vendor_reference, &optimized);
    let savings_vs_industrial = Savings::between(&industrial_reference, &optimized);

    Ok(EconomicsResult {
        optimized,
        vendor_reference,
        industrial_reference,
        savings_vs_vendor,
        savings_vs_industrial,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuse1_reference_case() {
        // Formlabs Fuse 1+ at the sustainability floor:
        // 0.29 * 8.17 L * 0.47 kg/L * 100 builds = 111.36 kg/yr,
        // at 50 per kg = 5567.86 per year.
        let result = evaluate_economics(8.17, 100, 50.0, 0.29).expect("valid inputs");
        assert!((result.optimized.annual_mass_kg - 111.357).abs() < 0.01);
        assert!((result.optimized.annual_cost - 5567.855).abs() < 0.01);
    }

    #[test]
    fn test_savings_against_vendor_reference() {
        let result = evaluate_economics(8.17, 100, 50.0, 0.29).expect("valid inputs");
        assert!((result.vendor_reference.annual_cost - 5759.85).abs() < 0.01);
        assert!((result.savings_vs_vendor.cost - 192.0).abs() < 0.01);
        assert!((result.savings_vs_vendor.mass_kg - 3.84).abs() < 0.01);
        assert!((result.savings_vs_vendor.percentage - 3.333).abs() < 0.01);
    }

    #[test]
    fn test_savings_against_industrial_reference() {
        let result = evaluate_economics(8.17, 100, 50.0, 0.29).expect("valid inputs");
        assert!((result.industrial_reference.annual_cost - 9599.75).abs() < 0.01);
        assert!((result.savings_vs_industrial.percentage - 42.0).abs() < 0.01);
    }

    #[test]
    fn test_ratio_above_reference_yields_negative_savings() {
        let result = evaluate_economics(8.17, 100, 50.0, 0.6).expect("valid inputs");
        assert!(result.savings_vs_vendor.cost < 0.0);
        assert!(result.savings_vs_vendor.percentage < 0.0);
        assert!(result.savings_vs_industrial.cost < 0.0);
    }

    #[test]
    fn test_per_build_quantities() {
        let result = evaluate_economics(100.0, 10, 80.0, 0.25).expect("valid inputs");
        assert!((result.optimized.virgin_per_build_l - 25.0).abs() < 1e-12);
        assert!((result.optimized.mass_per_build_kg - 11.75).abs() < 1e-12);
        assert!((result.optimized.annual_mass_kg - 117.5).abs() < 1e-12);
        assert!((result.optimized.annual_cost - 9400.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        assert!(evaluate_economics(0.0, 100, 50.0, 0.29).is_err());
        assert!(evaluate_economics(-8.0, 100, 50.0, 0.29).is_err());
        assert!(evaluate_economics(8.17, 0, 50.0, 0.29).is_err());
        assert!(evaluate_economics(8.17, 100, 0.0, 0.29).is_err());
        assert!(evaluate_economics(8.17, 100, -1.0, 0.29).is_err());
        assert!(evaluate_economics(8.17, 100, 50.0, 0.0).is_err());
        assert!(evaluate_economics(8.17, 100, 50.0, 1.2).is_err());
        assert!(evaluate_economics(f64::NAN, 100, 50.0, 0.29).is_err());
    }
}
