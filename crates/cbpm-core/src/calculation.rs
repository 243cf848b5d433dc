//! # Calculations
//!
//! Material estimation and small financial helpers.

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Default allowance for cutting losses and breakage (10%).
pub const DEFAULT_WASTE_FACTOR: f64 = 0.1;

/// Default compounding periods per year.
pub const DEFAULT_COMPOUNDING_FREQUENCY: u32 = 12;

// Absorbs representation error before rounding up, so 11.000000000000002
// units stays 11.
const UNIT_TOLERANCE: f64 = 1e-9;

/// Units of material needed to cover `area`, with waste.
///
/// Returns 0 when `coverage_per_unit` is 0.
///
/// ## Example
/// ```rust
/// use cbpm_core::calculation::{material_requirement, DEFAULT_WASTE_FACTOR};
///
/// // 12 blocks per m², 50 m² wall, 10% waste
/// let blocks = material_requirement(50.0, 1.0 / 12.0, DEFAULT_WASTE_FACTOR);
/// assert!((blocks - 660.0).abs() < 1e-9);
/// assert_eq!(material_requirement(50.0, 0.0, 0.1), 0.0);
/// ```
pub fn material_requirement(area: f64, coverage_per_unit: f64, waste_factor: f64) -> f64 {
    if coverage_per_unit == 0.0 {
        return 0.0;
    }
    (area / coverage_per_unit) * (1.0 + waste_factor)
}

/// [`material_requirement`] rounded up to whole units.
pub fn units_to_purchase(area: f64, coverage_per_unit: f64, waste_factor: f64) -> u64 {
    let required = material_requirement(area, coverage_per_unit, waste_factor);
    if !required.is_finite() || required <= 0.0 {
        return 0;
    }
    (required - UNIT_TOLERANCE).ceil() as u64
}

/// Relative change from `old` to `new`, in percent.
///
/// From 0 to anything non-zero is reported as 100.
pub fn percentage_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return if new == 0.0 { 0.0 } else { 100.0 };
    }
    ((new - old) / old) * 100.0
}

/// Final value of `principal` at annual `rate` compounded `frequency` times
/// a year over `years`.
pub fn compound_interest(
    principal: f64,
    rate: f64,
    years: f64,
    frequency: u32,
) -> ValidationResult<f64> {
    if frequency == 0 {
        return Err(ValidationError::MustBePositive {
            field: "frequency".to_string(),
        });
    }

    let n = f64::from(frequency);
    Ok(principal * (1.0 + rate / n).powf(n * years))
}

/// Rounds `value` to the nearest multiple of `nearest`.
///
/// A `nearest` of 0 returns `value` unchanged.
pub fn round_to_nearest(value: f64, nearest: f64) -> f64 {
    if nearest == 0.0 {
        return value;
    }
    (value / nearest).round() * nearest
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_requirement_without_waste() {
        for (area, coverage) in [(100.0, 4.0), (37.5, 2.5), (0.0, 3.0), (12.0, 0.5)] {
            assert_eq!(material_requirement(area, coverage, 0.0), area / coverage);
        }
    }

    #[test]
    fn test_material_requirement_zero_coverage() {
        for area in [0.0, 1.0, 1e6, -5.0] {
            assert_eq!(material_requirement(area, 0.0, DEFAULT_WASTE_FACTOR), 0.0);
        }
    }

    #[test]
    fn test_material_requirement_with_waste() {
        let bags = material_requirement(100.0, 10.0, DEFAULT_WASTE_FACTOR);
        assert!((bags - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_units_to_purchase_rounds_up() {
        assert_eq!(units_to_purchase(100.0, 10.0, DEFAULT_WASTE_FACTOR), 11);
        assert_eq!(units_to_purchase(101.0, 10.0, DEFAULT_WASTE_FACTOR), 12);
        assert_eq!(units_to_purchase(100.0, 0.0, DEFAULT_WASTE_FACTOR), 0);
        assert_eq!(units_to_purchase(-10.0, 1.0, 0.0), 0);
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(0.0, 0.0), 0.0);
        assert_eq!(percentage_change(0.0, 5.0), 100.0);
        assert_eq!(percentage_change(0.0, -5.0), 100.0);
        assert_eq!(percentage_change(100.0, 150.0), 50.0);
        assert_eq!(percentage_change(200.0, 50.0), -75.0);
    }

    #[test]
    fn test_compound_interest() {
        let yearly = compound_interest(1_000_000.0, 0.1, 2.0, 1).unwrap();
        assert!((yearly - 1_210_000.0).abs() < 1e-6);

        let monthly = compound_interest(1_000.0, 0.12, 1.0, DEFAULT_COMPOUNDING_FREQUENCY).unwrap();
        assert!((monthly - 1_126.825_030_131_97).abs() < 1e-6);

        assert!(compound_interest(1_000.0, 0.1, 1.0, 0).is_err());
    }

    #[test]
    fn test_round_to_nearest() {
        assert!((round_to_nearest(12.346, 0.01) - 12.35).abs() < 1e-9);
        assert_eq!(round_to_nearest(1_234.0, 50.0), 1_250.0);
        assert_eq!(round_to_nearest(1_224.0, 50.0), 1_200.0);
        assert_eq!(round_to_nearest(7.3, 0.0), 7.3);
    }
}
