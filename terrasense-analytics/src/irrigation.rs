//! Irrigation requirement.
//!
//! Water depth follows the usual depth-of-water formula: a moisture deficit
//! (volumetric fraction) across the root depth converts to millimetres of
//! water, and one millimetre over one hectare is 10,000 litres.

use terrasense_core::IrrigationPlan;

/// Default assumed root depth, centimetres.
pub const DEFAULT_ROOT_DEPTH_CM: f64 = 30.0;

/// Computes the irrigation requirement for a field.
///
/// `deficit = max(target - current, 0)`;
/// `depth_mm = deficit * root_depth_cm * 10`;
/// `liters = depth_mm * 10_000 * area_ha`.
///
/// When current moisture already meets the target the plan is a no-op.
pub fn irrigation_needs(
    current_moisture: f64,
    target_moisture: f64,
    area_ha: f64,
    root_depth_cm: f64,
) -> IrrigationPlan {
    let deficit = (target_moisture - current_moisture).max(0.0);
    let water_depth_mm = deficit * root_depth_cm * 10.0;
    let water_liters = water_depth_mm * 10_000.0 * area_ha;

    IrrigationPlan {
        needs_irrigation: deficit > 0.0,
        deficit,
        water_depth_mm,
        water_liters,
        area_ha,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_deficit_is_noop() {
        let plan = irrigation_needs(0.30, 0.30, 1.0, DEFAULT_ROOT_DEPTH_CM);
        assert!(!plan.needs_irrigation);
        assert_eq!(plan.water_liters, 0.0);
        assert_eq!(plan.water_depth_mm, 0.0);
    }

    #[test]
    fn test_surplus_is_noop() {
        let plan = irrigation_needs(0.40, 0.30, 1.0, DEFAULT_ROOT_DEPTH_CM);
        assert!(!plan.needs_irrigation);
        assert_eq!(plan.deficit, 0.0);
    }

    #[test]
    fn test_deficit_volume() {
        // deficit 0.15 * 30 cm * 10 = 45 mm; 45 * 10,000 * 2 ha = 900,000 L
        let plan = irrigation_needs(0.15, 0.30, 2.0, DEFAULT_ROOT_DEPTH_CM);
        assert!(plan.needs_irrigation);
        assert!((plan.deficit - 0.15).abs() < 1e-12);
        assert!((plan.water_depth_mm - 45.0).abs() < 1e-9);
        assert!((plan.water_liters - 900_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_volume_scales_with_area() {
        let one = irrigation_needs(0.20, 0.30, 1.0, DEFAULT_ROOT_DEPTH_CM);
        let three = irrigation_needs(0.20, 0.30, 3.0, DEFAULT_ROOT_DEPTH_CM);
        assert!((three.water_liters - 3.0 * one.water_liters).abs() < 1e-6);
    }

    #[test]
    fn test_root_depth_is_configurable() {
        let shallow = irrigation_needs(0.20, 0.30, 1.0, 15.0);
        let deep = irrigation_needs(0.20, 0.30, 1.0, 30.0);
        assert!((deep.water_depth_mm - 2.0 * shallow.water_depth_mm).abs() < 1e-9);
    }
}
