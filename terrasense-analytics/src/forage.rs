//! Forage and grazing analytics.
//!
//! Biomass follows the linear NDVI relation used throughout the product:
//! 15,000 kg/ha at the NDVI saturation bound of 0.8, zero below 0.2 where
//! the signal is bare soil or water.

use terrasense_core::GrazingPlan;

/// Biomass at the NDVI upper bound, kg/ha.
const MAX_BIOMASS_KG_PER_HA: f64 = 15_000.0;

/// NDVI below which no usable forage is assumed.
const NDVI_FLOOR: f64 = 0.2;

/// NDVI above which the relation saturates.
const NDVI_CEILING: f64 = 0.8;

/// Fraction of standing biomass actually available to grazing animals.
const UTILIZATION_FACTOR: f64 = 0.5;

/// Minimum rest period before regrazing, days.
const MIN_REST_DAYS: u32 = 21;

/// Rest period for the poorest pasture, days.
const MAX_REST_DAYS: u32 = 45;

/// Estimates standing biomass from NDVI, in kg/ha.
///
/// Returns 0 below the NDVI floor; saturates at the ceiling.
pub fn grass_biomass(ndvi: f64) -> f64 {
    if ndvi < NDVI_FLOOR {
        return 0.0;
    }
    MAX_BIOMASS_KG_PER_HA * ndvi.clamp(NDVI_FLOOR, NDVI_CEILING)
}

/// Derives a grazing-rotation schedule.
///
/// Available forage applies a 50% utilization factor to standing biomass;
/// days-until-rotation divides that by the herd's daily intake. The rest
/// period shrinks with pasture health (healthier pasture recovers faster)
/// but never below 21 days. A zero-size herd yields an effectively
/// unbounded rotation window, reported as `f64::INFINITY`.
pub fn grazing_rotation(
    ndvi: f64,
    area_ha: f64,
    animal_count: u32,
    daily_intake_kg: f64,
) -> GrazingPlan {
    let biomass = grass_biomass(ndvi);
    let available_forage = biomass * area_ha * UTILIZATION_FACTOR;

    let daily_demand = f64::from(animal_count) * daily_intake_kg;
    let days_until_rotation = if daily_demand > 0.0 {
        available_forage / daily_demand
    } else {
        f64::INFINITY
    };

    // Linear from MAX_REST_DAYS at the floor down to MIN_REST_DAYS at the
    // ceiling, clamped at both ends.
    let health = ((ndvi - NDVI_FLOOR) / (NDVI_CEILING - NDVI_FLOOR)).clamp(0.0, 1.0);
    let span = f64::from(MAX_REST_DAYS - MIN_REST_DAYS);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rest_period_days = (f64::from(MAX_REST_DAYS) - health * span).round() as u32;

    GrazingPlan {
        biomass_kg_per_ha: biomass,
        available_forage_kg: available_forage,
        days_until_rotation,
        rest_period_days,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biomass_below_floor_is_zero() {
        assert_eq!(grass_biomass(0.1), 0.0);
        assert_eq!(grass_biomass(-0.3), 0.0);
    }

    #[test]
    fn test_biomass_saturates_at_ceiling() {
        assert_eq!(grass_biomass(0.9), grass_biomass(0.8));
        assert!((grass_biomass(0.8) - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_biomass_linear_inside_bounds() {
        assert!((grass_biomass(0.5) - 7_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_days() {
        // 0.6 NDVI -> 9,000 kg/ha; 10 ha -> 45,000 kg available after
        // utilization; 20 head * 12 kg/day = 240 kg/day -> 187.5 days.
        let plan = grazing_rotation(0.6, 10.0, 20, 12.0);
        assert!((plan.biomass_kg_per_ha - 9_000.0).abs() < 1e-9);
        assert!((plan.available_forage_kg - 45_000.0).abs() < 1e-9);
        assert!((plan.days_until_rotation - 187.5).abs() < 1e-9);
    }

    #[test]
    fn test_rest_period_floors_at_21() {
        let healthy = grazing_rotation(0.8, 1.0, 1, 12.0);
        assert_eq!(healthy.rest_period_days, 21);

        let saturated = grazing_rotation(0.95, 1.0, 1, 12.0);
        assert_eq!(saturated.rest_period_days, 21);
    }

    #[test]
    fn test_rest_period_grows_for_poor_pasture() {
        let poor = grazing_rotation(0.25, 1.0, 1, 12.0);
        let healthy = grazing_rotation(0.7, 1.0, 1, 12.0);
        assert!(poor.rest_period_days > healthy.rest_period_days);
        assert!(poor.rest_period_days <= 45);
    }

    #[test]
    fn test_zero_herd_is_unbounded() {
        let plan = grazing_rotation(0.6, 10.0, 0, 12.0);
        assert!(plan.days_until_rotation.is_infinite());
    }

    #[test]
    fn test_bare_pasture_has_no_forage() {
        let plan = grazing_rotation(0.1, 10.0, 20, 12.0);
        assert_eq!(plan.available_forage_kg, 0.0);
        assert_eq!(plan.days_until_rotation, 0.0);
    }
}
