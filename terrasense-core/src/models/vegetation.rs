//! Vegetation-index observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::timeseries::DataQuality;
use crate::error::CoreError;

/// One dated NDVI/EVI observation.
///
/// Values are in the conventional -1.0 to 1.0 range; the provider's raw
/// integer codes are scaled before an observation is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationObservation {
    /// Calendar date of the composite.
    pub date: NaiveDate,
    /// Normalized Difference Vegetation Index.
    pub ndvi: f64,
    /// Enhanced Vegetation Index.
    pub evi: f64,
    /// Provenance of the values.
    pub quality: DataQuality,
}

impl VegetationObservation {
    /// Creates an observation.
    pub fn new(date: NaiveDate, ndvi: f64, evi: f64, quality: DataQuality) -> Self {
        Self {
            date,
            ndvi,
            evi,
            quality,
        }
    }

    /// Validates both indices against the conventional range.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if either index is non-finite or
    /// outside [-1.0, 1.0].
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, v) in [("ndvi", self.ndvi), ("evi", self.evi)] {
            if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
                return Err(CoreError::InvalidData(format!(
                    "{}: {name} {v} outside [-1, 1]",
                    self.date
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_range() {
        let ok = VegetationObservation::new(date(2025, 7, 1), 0.62, 0.41, DataQuality::Measured);
        assert!(ok.validate().is_ok());

        let bad = VegetationObservation::new(date(2025, 7, 1), 1.5, 0.4, DataQuality::Measured);
        assert!(bad.validate().is_err());
    }
}
