//! Time-series types.
//!
//! This module contains the types that flow through the retrieval pipeline:
//! - [`TimeSeriesPoint`] - One dated observation with a provenance tag
//! - [`DataQuality`] - How trustworthy an observation is
//! - [`FetchRequest`] - The (location, range, parameters) tuple used as a cache key
//! - [`CacheEntry`] - A stored series with its storage timestamp

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

// ============================================================================
// Data Quality
// ============================================================================

/// Provenance of an observation.
///
/// Lower tiers in the fallback chain produce lower-fidelity data; the tag
/// travels with each point so consumers can weigh it accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    /// Direct satellite measurement.
    Measured,
    /// Output of an upstream model (e.g. reanalysis).
    Modeled,
    /// Locally synthesized estimate.
    Estimated,
}

impl DataQuality {
    /// Returns the display name for this quality level.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Measured => "Measured",
            Self::Modeled => "Modeled",
            Self::Estimated => "Estimated",
        }
    }
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Time Series Point
// ============================================================================

/// A single dated observation.
///
/// Points are immutable once produced by a provider adapter; a cached series
/// is replaced wholesale, never mutated field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Observed value (volumetric soil moisture 0.0-1.0, NDVI/EVI -1.0-1.0).
    pub value: f64,
    /// Provenance of the value.
    pub quality: DataQuality,
    /// Identifier of the source that produced the value (e.g. "smap.cmr").
    pub source_id: String,
}

impl TimeSeriesPoint {
    /// Creates a new point.
    pub fn new(
        date: NaiveDate,
        value: f64,
        quality: DataQuality,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            date,
            value,
            quality,
            source_id: source_id.into(),
        }
    }

    /// Validates the value against a provider-specific plausible range.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if the value is non-finite or
    /// outside `[min, max]`.
    pub fn validate_range(&self, min: f64, max: f64) -> Result<(), CoreError> {
        if !self.value.is_finite() {
            return Err(CoreError::InvalidData(format!(
                "{}: non-finite value",
                self.date
            )));
        }
        if self.value < min || self.value > max {
            return Err(CoreError::InvalidData(format!(
                "{}: value {} outside [{min}, {max}]",
                self.date, self.value
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Fetch Request
// ============================================================================

/// A request for a time series at a point over a date range.
///
/// Constructed per call and used (string-normalized) as the cache key, so a
/// new date range simply misses the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// First day of the requested window (inclusive).
    pub start: NaiveDate,
    /// Last day of the requested window (inclusive).
    pub end: NaiveDate,
    /// Requested parameter set (e.g. "soil_moisture", "ndvi,evi").
    pub parameter_set: String,
}

impl FetchRequest {
    /// Creates a new request.
    pub fn new(
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        parameter_set: impl Into<String>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            start,
            end,
            parameter_set: parameter_set.into(),
        }
    }

    /// Validates coordinates and date ordering.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRequest` for out-of-range coordinates or
    /// an inverted date range. These are terminal: retrying cannot help.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(CoreError::InvalidRequest(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(CoreError::InvalidRequest(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        if self.start > self.end {
            return Err(CoreError::InvalidRequest(format!(
                "start {} after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Returns the normalized cache key for this request.
    ///
    /// Coordinates are rounded to 4 decimal places (~11 m) so that nearby
    /// float representations of the same field share an entry.
    pub fn cache_key(&self) -> String {
        format!(
            "{:.4}_{:.4}_{}_{}_{}",
            self.latitude, self.longitude, self.start, self.end, self.parameter_set
        )
    }

    /// Iterates the days of the requested window, inclusive on both ends.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        let end = self.end;
        start
            .iter_days()
            .take_while(move |d| *d <= end)
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}) {}..{} [{}]",
            self.latitude, self.longitude, self.start, self.end, self.parameter_set
        )
    }
}

// ============================================================================
// Cache Entry
// ============================================================================

/// A cached series together with its storage timestamp.
///
/// Entries are owned by the store; callers never hold a mutable reference.
/// There is no automatic eviction - a fresh fetch overwrites the entry under
/// the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The request-derived cache key.
    pub key: String,
    /// The stored series, ordered by date.
    pub series: Vec<T>,
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Creates an entry stamped with the current time.
    pub fn new(key: impl Into<String>, series: Vec<T>) -> Self {
        Self {
            key: key.into(),
            series,
            stored_at: Utc::now(),
        }
    }

    /// Returns true if the entry holds no points.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
