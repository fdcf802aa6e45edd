//! Derived assessment types.
//!
//! These are value objects computed on demand from an already-fetched time
//! series. They are recomputed per call and never persisted by this
//! subsystem; persisting them would let a stale assessment outlive the data
//! it was derived from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Trend
// ============================================================================

/// Direction of a short-window trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Slope above the +5% band.
    Increasing,
    /// Slope within the ±5% band.
    Stable,
    /// Slope below the -5% band.
    Decreasing,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Increasing => "increasing",
            Self::Stable => "stable",
            Self::Decreasing => "decreasing",
        };
        write!(f, "{name}")
    }
}

/// Result of the trend regression over the most recent points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Classified direction.
    pub direction: TrendDirection,
    /// Slope relative to the window mean, as a percentage per step.
    pub percent: f64,
}

impl TrendAnalysis {
    /// A flat trend, used for series too short to regress.
    pub fn flat() -> Self {
        Self {
            direction: TrendDirection::Stable,
            percent: 0.0,
        }
    }
}

// ============================================================================
// Drought
// ============================================================================

/// Drought severity band, ordered from no drought to exceptional drought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroughtLevel {
    /// Average moisture at or above 0.30.
    None,
    /// Average moisture in [0.25, 0.30).
    Mild,
    /// Average moisture in [0.20, 0.25).
    Moderate,
    /// Average moisture in [0.15, 0.20).
    Severe,
    /// Average moisture in [0.10, 0.15).
    Extreme,
    /// Average moisture below 0.10.
    Exceptional,
}

impl DroughtLevel {
    /// Numeric severity, 0 (none) to 5 (exceptional).
    pub fn severity(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
            Self::Extreme => 4,
            Self::Exceptional => 5,
        }
    }

    /// Returns the display name for this band.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Extreme => "extreme",
            Self::Exceptional => "exceptional",
        }
    }
}

impl fmt::Display for DroughtLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A drought assessment derived from a moisture series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroughtAssessment {
    /// Average volumetric moisture over the series, if any data was present.
    pub average_moisture: Option<f64>,
    /// Classified band.
    pub level: DroughtLevel,
    /// Numeric severity, 0-5.
    pub severity: u8,
    /// Trend over the most recent points, percent per step.
    pub trend_percent: f64,
    /// Ordered, human-readable recommendations for the band.
    pub recommendations: Vec<String>,
}

impl DroughtAssessment {
    /// The degraded assessment returned for an empty series.
    ///
    /// Callers may still want to render a UI state, so this is a value, not
    /// an error.
    pub fn insufficient_data() -> Self {
        Self {
            average_moisture: None,
            level: DroughtLevel::None,
            severity: 0,
            trend_percent: 0.0,
            recommendations: vec!["Insufficient data to assess drought conditions.".to_string()],
        }
    }
}

// ============================================================================
// Irrigation
// ============================================================================

/// An irrigation requirement computed from current and target moisture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationPlan {
    /// Whether any water is needed at all.
    pub needs_irrigation: bool,
    /// Moisture deficit (target - current), floored at zero.
    pub deficit: f64,
    /// Required water depth in millimetres.
    pub water_depth_mm: f64,
    /// Required volume in litres for the given area.
    pub water_liters: f64,
    /// Area the volume applies to, in hectares.
    pub area_ha: f64,
}

// ============================================================================
// Moisture Prediction
// ============================================================================

/// One day of the short-horizon moisture forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoisturePrediction {
    /// Forecast date.
    pub date: NaiveDate,
    /// Predicted volumetric moisture, clamped to the physical range.
    pub predicted_moisture: f64,
    /// Confidence in [0, 1], decaying with horizon.
    pub confidence: f64,
}

// ============================================================================
// Grazing
// ============================================================================

/// A grazing-rotation schedule derived from pasture biomass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrazingPlan {
    /// Standing biomass estimate in kg/ha.
    pub biomass_kg_per_ha: f64,
    /// Forage available to the herd after the utilization factor, in kg.
    pub available_forage_kg: f64,
    /// Days until the herd should be rotated off the paddock.
    pub days_until_rotation: f64,
    /// Rest period before regrazing, in days (minimum 21).
    pub rest_period_days: u32,
}

// ============================================================================
// Tests
// ============================================================================
