//! Trend analysis.
//!
//! Ordinary least squares over the most recent window of a series. The
//! slope is expressed relative to the window mean so that "percent per
//! step" is comparable across moisture levels.

use terrasense_core::{TimeSeriesPoint, TrendAnalysis, TrendDirection};

/// Number of most-recent points the trend regression considers.
pub const TREND_WINDOW: usize = 5;

/// Slope band (in percent per step) inside which a trend counts as stable.
const STABLE_BAND_PERCENT: f64 = 5.0;

/// Ordinary least squares fit over evenly spaced values.
///
/// Returns `(slope, intercept)` with x taken as 0..n. Fewer than two values
/// yield a flat fit through the single value (or zero).
pub fn linear_regression(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n < 2 {
        return (0.0, values.first().copied().unwrap_or(0.0));
    }

    #[allow(clippy::cast_precision_loss)]
    let n_f = n as f64;
    #[allow(clippy::cast_precision_loss)]
    let (sum_x, sum_y, sum_xy, sum_xx) = values.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), (i, y)| {
            let x = i as f64;
            (sx + x, sy + y, sxy + x * y, sxx + x * x)
        },
    );

    let denom = n_f * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return (0.0, sum_y / n_f);
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n_f;
    (slope, intercept)
}

/// Analyzes the trend over the most recent [`TREND_WINDOW`] points.
///
/// Series shorter than two points classify as stable at 0%.
pub fn analyze_trend(series: &[TimeSeriesPoint]) -> TrendAnalysis {
    let window_start = series.len().saturating_sub(TREND_WINDOW);
    let values: Vec<f64> = series[window_start..].iter().map(|p| p.value).collect();

    if values.len() < 2 {
        return TrendAnalysis::flat();
    }

    let (slope, _) = linear_regression(&values);
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    let percent = if mean.abs() < f64::EPSILON {
        0.0
    } else {
        slope / mean.abs() * 100.0
    };

    let direction = if percent > STABLE_BAND_PERCENT {
        TrendDirection::Increasing
    } else if percent < -STABLE_BAND_PERCENT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    TrendAnalysis { direction, percent }
}

// ============================================================================
// Tests
// ============================================================================
