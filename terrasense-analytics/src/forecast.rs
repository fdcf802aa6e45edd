//! Short-horizon moisture forecast.
//!
//! Linear extrapolation of the recent trend, optionally nudged by a
//! rainfall forecast. This is deliberately simple: at a 7-day horizon the
//! regression dominates any model sophistication the input data could
//! support, and confidence decays accordingly.

use chrono::Days;
use terrasense_core::{MoisturePrediction, TimeSeriesPoint};

use crate::trend::{linear_regression, TREND_WINDOW};

/// Forecast horizon, days.
pub const FORECAST_DAYS: u32 = 7;

/// Empirical moisture increase per millimetre of forecast rain.
pub const RAIN_MM_TO_MOISTURE: f64 = 0.001;

/// Confidence on the first forecast day.
const BASE_CONFIDENCE: f64 = 0.9;

/// Confidence lost per additional day of horizon.
const CONFIDENCE_DECAY_PER_DAY: f64 = 0.1;

/// Predicts volumetric moisture for the next [`FORECAST_DAYS`] days.
///
/// `rainfall_mm`, when provided, nudges each day's prediction by
/// [`RAIN_MM_TO_MOISTURE`] per millimetre; missing trailing days are
/// treated as no rain. Predictions are clamped to the physical 0.0-1.0
/// range. An empty series yields an empty forecast.
pub fn predict_moisture(
    series: &[TimeSeriesPoint],
    rainfall_mm: Option<&[f64]>,
) -> Vec<MoisturePrediction> {
    let Some(last) = series.last() else {
        return Vec::new();
    };

    let window_start = series.len().saturating_sub(TREND_WINDOW);
    let values: Vec<f64> = series[window_start..].iter().map(|p| p.value).collect();
    let (slope, _) = linear_regression(&values);

    (1..=FORECAST_DAYS)
        .map(|day| {
            let rain = rainfall_mm
                .and_then(|r| r.get(day as usize - 1))
                .copied()
                .unwrap_or(0.0);

            let extrapolated = last.value + slope * f64::from(day) + rain * RAIN_MM_TO_MOISTURE;
            let confidence =
                (BASE_CONFIDENCE - CONFIDENCE_DECAY_PER_DAY * f64::from(day - 1)).max(0.0);

            MoisturePrediction {
                date: last.date + Days::new(u64::from(day)),
                predicted_moisture: extrapolated.clamp(0.0, 1.0),
                confidence,
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
