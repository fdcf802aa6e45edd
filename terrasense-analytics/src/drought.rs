//! Drought classification.
//!
//! Average moisture over the series maps onto six ordered bands with fixed
//! thresholds. Each band carries a canned recommendation list; a rapidly
//! declining trend appends a warning line and a rapidly improving one a
//! recovery note.

use terrasense_core::{DroughtAssessment, DroughtLevel, TimeSeriesPoint};

use crate::trend::analyze_trend;

/// Trend (percent per step) below which a drought warning is appended.
const RAPID_DECLINE_PERCENT: f64 = -10.0;

/// Trend above which a recovery note is appended.
const RAPID_RECOVERY_PERCENT: f64 = 10.0;

/// Maps average volumetric moisture onto a drought band.
fn classify(average: f64) -> DroughtLevel {
    if average < 0.10 {
        DroughtLevel::Exceptional
    } else if average < 0.15 {
        DroughtLevel::Extreme
    } else if average < 0.20 {
        DroughtLevel::Severe
    } else if average < 0.25 {
        DroughtLevel::Moderate
    } else if average < 0.30 {
        DroughtLevel::Mild
    } else {
        DroughtLevel::None
    }
}

/// Canned recommendations per band.
fn recommendations(level: DroughtLevel) -> Vec<String> {
    let lines: &[&str] = match level {
        DroughtLevel::None => &[
            "Soil moisture is adequate; continue the current schedule.",
            "Monitor weekly for early signs of decline.",
        ],
        DroughtLevel::Mild => &[
            "Moisture is slightly below optimal; consider light supplemental irrigation.",
            "Prioritize water for seedlings and shallow-rooted crops.",
        ],
        DroughtLevel::Moderate => &[
            "Begin regular supplemental irrigation.",
            "Apply mulch to reduce evaporation losses.",
            "Delay planting of water-intensive crops.",
        ],
        DroughtLevel::Severe => &[
            "Irrigate on a strict schedule; water early morning or late evening.",
            "Switch to drought-tolerant varieties where possible.",
            "Reduce livestock grazing pressure on stressed pasture.",
        ],
        DroughtLevel::Extreme => &[
            "Ration available water to the highest-value crops.",
            "Consider early harvest of crops unlikely to recover.",
            "Arrange supplemental feed; pasture regrowth will be minimal.",
        ],
        DroughtLevel::Exceptional => &[
            "Emergency conditions: irrigate only survival-critical plantings.",
            "Destock pasture to sustainable levels.",
            "Contact local extension services about drought assistance.",
        ],
    };
    lines.iter().map(|s| (*s).to_string()).collect()
}

/// Classifies drought conditions from a moisture series.
///
/// Empty input yields [`DroughtAssessment::insufficient_data`], never an
/// error.
pub fn detect_drought(series: &[TimeSeriesPoint]) -> DroughtAssessment {
    if series.is_empty() {
        return DroughtAssessment::insufficient_data();
    }

    #[allow(clippy::cast_precision_loss)]
    let average = series.iter().map(|p| p.value).sum::<f64>() / series.len() as f64;
    let trend = analyze_trend(series);

    let level = classify(average);
    let mut recs = recommendations(level);

    if trend.percent < RAPID_DECLINE_PERCENT {
        recs.push("Warning: moisture is declining rapidly; conditions may worsen within days.".to_string());
    } else if trend.percent > RAPID_RECOVERY_PERCENT {
        recs.push("Moisture is recovering quickly; reassess before committing to drought measures.".to_string());
    }

    DroughtAssessment {
        average_moisture: Some(average),
        level,
        severity: level.severity(),
        trend_percent: trend.percent,
        recommendations: recs,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use terrasense_core::DataQuality;

    fn series(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                TimeSeriesPoint::new(
                    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap() + chrono::Days::new(i as u64),
                    *v,
                    DataQuality::Measured,
                    "test",
                )
            })
            .collect()
    }

    #[test]
    fn test_exceptional_band() {
        let a = detect_drought(&series(&[0.05, 0.05, 0.05]));
        assert_eq!(a.level, DroughtLevel::Exceptional);
        assert_eq!(a.severity, 5);
    }

    #[test]
    fn test_none_band() {
        let a = detect_drought(&series(&[0.32, 0.32, 0.32]));
        assert_eq!(a.level, DroughtLevel::None);
        assert_eq!(a.severity, 0);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify(0.10), DroughtLevel::Extreme);
        assert_eq!(classify(0.15), DroughtLevel::Severe);
        assert_eq!(classify(0.20), DroughtLevel::Moderate);
        assert_eq!(classify(0.25), DroughtLevel::Mild);
        assert_eq!(classify(0.30), DroughtLevel::None);
        assert_eq!(classify(0.0999), DroughtLevel::Exceptional);
    }

    #[test]
    fn test_rapid_decline_appends_warning() {
        let a = detect_drought(&series(&[0.30, 0.25, 0.20, 0.15, 0.10]));
        assert!(a.trend_percent < -10.0);
        assert!(a
            .recommendations
            .last()
            .unwrap()
            .starts_with("Warning: moisture is declining rapidly"));
    }

    #[test]
    fn test_rapid_recovery_appends_note() {
        let a = detect_drought(&series(&[0.10, 0.15, 0.20, 0.25, 0.30]));
        assert!(a.trend_percent > 10.0);
        assert!(a
            .recommendations
            .last()
            .unwrap()
            .contains("recovering quickly"));
    }

    #[test]
    fn test_empty_series_degrades() {
        let a = detect_drought(&[]);
        assert!(a.average_moisture.is_none());
        assert_eq!(a.severity, 0);
    }

    #[test]
    fn test_every_band_has_recommendations() {
        for level in [
            DroughtLevel::None,
            DroughtLevel::Mild,
            DroughtLevel::Moderate,
            DroughtLevel::Severe,
            DroughtLevel::Extreme,
            DroughtLevel::Exceptional,
        ] {
            assert!(!recommendations(level).is_empty());
        }
    }
}
