//! Granule metadata parsing.
//!
//! Maps catalog granules to daily moisture points. A granule contributes a
//! point only when its metadata carries a usable moisture value; the tier is
//! deliberately permissive because the catalog is best-effort and the
//! modeled tier backs it up.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use terrasense_core::{DataQuality, TimeSeriesPoint};

use super::api::CmrGranule;

/// Source identifier stamped on catalog-derived points.
pub(crate) const SOURCE_ID: &str = "smap.cmr";

/// Granule attribute carrying the mean surface soil moisture.
const MOISTURE_ATTRIBUTE: &str = "SurfaceSoilMoisture";

/// Extracts the granule's observation date from its temporal extent.
fn granule_date(granule: &CmrGranule) -> Option<NaiveDate> {
    let time_start = granule.time_start.as_deref()?;
    NaiveDate::parse_from_str(time_start.get(..10)?, "%Y-%m-%d").ok()
}

/// Extracts the granule-level moisture value, if one is present and sane.
fn granule_moisture(granule: &CmrGranule) -> Option<f64> {
    let attribute = granule
        .additional_attributes
        .iter()
        .find(|a| a.name == MOISTURE_ATTRIBUTE)?;
    let value: f64 = attribute.values.first()?.parse().ok()?;
    (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(value)
}

/// Maps granules onto an ordered daily series.
///
/// Granules without a date or a usable value are skipped. Multiple granules
/// on one day (ascending/descending passes) keep the first value seen.
pub fn parse_granules(granules: &[CmrGranule]) -> Vec<TimeSeriesPoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for granule in granules {
        let Some(date) = granule_date(granule) else {
            debug!(id = ?granule.id, "Granule without temporal extent, skipping");
            continue;
        };
        let Some(value) = granule_moisture(granule) else {
            debug!(id = ?granule.id, "Granule without usable moisture value, skipping");
            continue;
        };
        by_date.entry(date).or_insert(value);
    }

    by_date
        .into_iter()
        .map(|(date, value)| TimeSeriesPoint::new(date, value, DataQuality::Measured, SOURCE_ID))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn granule(time_start: Option<&str>, moisture: Option<&str>) -> CmrGranule {
        let json = serde_json::json!({
            "id": "G1",
            "title": "SMAP_L3",
            "time_start": time_start,
            "additional_attributes": moisture
                .map(|m| serde_json::json!([{"name": "SurfaceSoilMoisture", "values": [m]}]))
                .unwrap_or_else(|| serde_json::json!([])),
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_parses_dated_granules() {
        let points = parse_granules(&[
            granule(Some("2025-07-02T18:00:00.000Z"), Some("0.28")),
            granule(Some("2025-07-01T06:00:00.000Z"), Some("0.31")),
        ]);

        assert_eq!(points.len(), 2);
        // Ordered by date regardless of input order.
        assert_eq!(points[0].date.to_string(), "2025-07-01");
        assert_eq!(points[0].value, 0.31);
        assert_eq!(points[0].quality, DataQuality::Measured);
        assert_eq!(points[0].source_id, SOURCE_ID);
    }

    #[test]
    fn test_skips_unusable_granules() {
        let points = parse_granules(&[
            granule(None, Some("0.3")),
            granule(Some("2025-07-01T06:00:00Z"), None),
            granule(Some("2025-07-02T06:00:00Z"), Some("not-a-number")),
            granule(Some("2025-07-03T06:00:00Z"), Some("7.5")),
        ]);
        assert!(points.is_empty());
    }

    #[test]
    fn test_first_granule_per_day_wins() {
        let points = parse_granules(&[
            granule(Some("2025-07-01T06:00:00Z"), Some("0.31")),
            granule(Some("2025-07-01T18:00:00Z"), Some("0.27")),
        ]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 0.31);
    }
}
