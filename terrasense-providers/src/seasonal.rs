//! Synthetic soil-moisture tier: seasonal estimate.
//!
//! The last line of defense: one point per day, base value picked by
//! calendar month from a fixed wet/dry-season table for the deployment
//! region (a monsoon climate: dry winter, pre-monsoon build-up, wet
//! June-September, post-monsoon drawdown), with a small jitter derived
//! deterministically from the request so repeated calls agree. Every point
//! is tagged [`DataQuality::Estimated`]; consumers can see exactly how far
//! the data degraded.

use async_trait::async_trait;
use chrono::Datelike;
use tracing::{debug, instrument};

use terrasense_core::{DataQuality, FetchRequest, TimeSeriesPoint};
use terrasense_fetch::{FetchError, MoistureStrategy, SourceTier, StrategyOutcome};

/// Source identifier stamped on synthetic points.
pub(crate) const SOURCE_ID: &str = "seasonal.estimate";

/// Base volumetric moisture per calendar month, January first.
const MONTHLY_BASE: [f64; 12] = [
    0.16, // Jan - dry winter
    0.15, // Feb
    0.18, // Mar - pre-monsoon
    0.22, // Apr
    0.28, // May
    0.38, // Jun - monsoon onset
    0.42, // Jul
    0.40, // Aug
    0.36, // Sep
    0.30, // Oct - post-monsoon
    0.22, // Nov
    0.18, // Dec
];

/// Maximum jitter magnitude applied to the monthly base.
const JITTER_RANGE: f64 = 0.02;

/// Deterministic per-day jitter in [-JITTER_RANGE, JITTER_RANGE].
///
/// A splitmix64-style bit mix over the rounded coordinates and the day
/// ordinal; no RNG state, so equal inputs always produce equal series.
fn jitter(latitude: f64, longitude: f64, day_ordinal: i32) -> f64 {
    #[allow(clippy::cast_possible_truncation)]
    let mut x = ((latitude * 1e4).round() as i64 as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ ((longitude * 1e4).round() as i64 as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9)
        ^ (day_ordinal as i64 as u64).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;

    #[allow(clippy::cast_precision_loss)]
    let unit = (x >> 11) as f64 / (1u64 << 53) as f64;
    (unit * 2.0 - 1.0) * JITTER_RANGE
}

/// Builds the synthetic series for a request.
pub fn estimate_series(request: &FetchRequest) -> Vec<TimeSeriesPoint> {
    request
        .days()
        .map(|date| {
            let base = MONTHLY_BASE[date.month0() as usize];
            let value = (base + jitter(request.latitude, request.longitude, date.num_days_from_ce()))
                .clamp(0.0, 1.0);
            TimeSeriesPoint::new(date, value, DataQuality::Estimated, SOURCE_ID)
        })
        .collect()
}

/// Final soil-moisture tier. Always produces; never signals try-next.
#[derive(Debug, Clone, Default)]
pub struct SeasonalStrategy;

impl SeasonalStrategy {
    /// Creates the tier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MoistureStrategy for SeasonalStrategy {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Synthetic
    }

    #[instrument(skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Result<StrategyOutcome, FetchError> {
        let series = estimate_series(request);
        debug!(points = series.len(), "Synthesized seasonal series");
        Ok(StrategyOutcome::Series(series))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(start: (i32, u32, u32), end: (i32, u32, u32)) -> FetchRequest {
        FetchRequest::new(
            23.81,
            90.41,
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            "soil_moisture",
        )
    }

    #[test]
    fn test_one_point_per_day() {
        let series = estimate_series(&request((2025, 7, 1), (2025, 7, 31)));
        assert_eq!(series.len(), 31);
        assert!(series.iter().all(|p| p.quality == DataQuality::Estimated));
        assert!(series.iter().all(|p| p.source_id == SOURCE_ID));
    }

    #[test]
    fn test_deterministic_for_equal_inputs() {
        let a = estimate_series(&request((2025, 7, 1), (2025, 7, 10)));
        let b = estimate_series(&request((2025, 7, 1), (2025, 7, 10)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_in_physical_range() {
        let series = estimate_series(&request((2025, 1, 1), (2025, 12, 31)));
        assert!(series.iter().all(|p| (0.0..=1.0).contains(&p.value)));
    }

    #[test]
    fn test_jitter_bounded_around_monthly_base() {
        let series = estimate_series(&request((2025, 7, 1), (2025, 7, 31)));
        for p in &series {
            assert!((p.value - MONTHLY_BASE[6]).abs() <= JITTER_RANGE + 1e-12);
        }
    }

    #[test]
    fn test_monsoon_wetter_than_winter() {
        let monsoon = estimate_series(&request((2025, 7, 1), (2025, 7, 31)));
        let winter = estimate_series(&request((2025, 1, 1), (2025, 1, 31)));
        let avg = |s: &[TimeSeriesPoint]| s.iter().map(|p| p.value).sum::<f64>() / s.len() as f64;
        assert!(avg(&monsoon) > avg(&winter) + 0.1);
    }

    #[test]
    fn test_jitter_varies_by_location() {
        let dhaka = jitter(23.81, 90.41, 739_000);
        let sylhet = jitter(24.89, 91.87, 739_000);
        assert!((dhaka - sylhet).abs() > 1e-9);
    }

    #[tokio::test]
    async fn test_strategy_always_produces() {
        let strategy = SeasonalStrategy::new();
        let outcome = strategy.fetch(&request((2025, 7, 1), (2025, 7, 1))).await.unwrap();
        match outcome {
            StrategyOutcome::Series(series) => assert_eq!(series.len(), 1),
            StrategyOutcome::TryNext(_) => panic!("synthetic tier must not defer"),
        }
    }
}
