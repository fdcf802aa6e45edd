//! Wetness-to-moisture scaling.
//!
//! Root-zone wetness is a 0-1 proxy, not a volumetric fraction. The product
//! has always mapped it down by a fixed scale (default 0.4); the scale is
//! configuration because its accuracy is unverified.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use terrasense_core::{DataQuality, TimeSeriesPoint};

/// Source identifier stamped on modeled points.
pub(crate) const SOURCE_ID: &str = "power.gwetroot";

/// Values at or below this are the provider's missing-data sentinel.
const FILL_THRESHOLD: f64 = -900.0;

/// Scales a raw `YYYYMMDD -> wetness` map into a moisture series.
///
/// Fill values and unparseable dates are skipped; results are clamped into
/// the volumetric range and tagged [`DataQuality::Modeled`].
pub fn scale_wetness_series(
    raw: &BTreeMap<String, f64>,
    wetness_scale: f64,
) -> Vec<TimeSeriesPoint> {
    raw.iter()
        .filter_map(|(date_str, wetness)| {
            if *wetness <= FILL_THRESHOLD || !wetness.is_finite() {
                debug!(date = %date_str, "Skipping fill value");
                return None;
            }
            let date = NaiveDate::parse_from_str(date_str, "%Y%m%d").ok()?;
            let moisture = (wetness * wetness_scale).clamp(0.0, 1.0);
            Some(TimeSeriesPoint::new(
                date,
                moisture,
                DataQuality::Modeled,
                SOURCE_ID,
            ))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
