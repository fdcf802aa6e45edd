//! Result bundle parsing.
//!
//! The result bundle's CSV carries raw integer index codes; the provider
//! documents a 0.0001 scale factor mapping them into the conventional
//! -1.0 to 1.0 range, and -3000 as the fill value for cells it could not
//! retrieve.

use chrono::NaiveDate;
use tracing::{debug, warn};

use terrasense_core::{DataQuality, VegetationObservation};
use terrasense_fetch::FetchError;

/// Documented scale factor for raw index codes.
pub(crate) const SCALE_FACTOR: f64 = 0.0001;

/// Documented fill value for unretrievable cells.
const FILL_VALUE: f64 = -3000.0;

/// Parses the result CSV into dated observations.
///
/// The header row locates the `Date` column and the NDVI/EVI layer columns
/// by layer-name substring. Rows with fill values or unparseable fields are
/// skipped with a trace; observations outside the valid index range after
/// scaling are dropped.
///
/// # Errors
///
/// Returns `InvalidResponse` when the payload is not UTF-8 text or the
/// header lacks a required column.
pub fn parse_vegetation_csv(
    bytes: &[u8],
    ndvi_layer: &str,
    evi_layer: &str,
) -> Result<Vec<VegetationObservation>, FetchError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| FetchError::InvalidResponse("result CSV is not UTF-8".to_string()))?;

    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| FetchError::InvalidResponse("result CSV is empty".to_string()))?;

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let find = |what: &str, pred: &dyn Fn(&str) -> bool| -> Result<usize, FetchError> {
        columns.iter().position(|c| pred(c)).ok_or_else(|| {
            FetchError::InvalidResponse(format!("result CSV header lacks {what} column"))
        })
    };

    let date_idx = find("Date", &|c: &str| c.eq_ignore_ascii_case("date"))?;
    let ndvi_idx = find("NDVI", &|c: &str| c.contains(ndvi_layer))?;
    let evi_idx = find("EVI", &|c: &str| c.contains(evi_layer))?;

    let mut observations = Vec::new();

    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        let parsed = (|| {
            let date = NaiveDate::parse_from_str(fields.get(date_idx)?, "%Y-%m-%d").ok()?;
            let ndvi_raw: f64 = fields.get(ndvi_idx)?.parse().ok()?;
            let evi_raw: f64 = fields.get(evi_idx)?.parse().ok()?;
            Some((date, ndvi_raw, evi_raw))
        })();

        let Some((date, ndvi_raw, evi_raw)) = parsed else {
            debug!(line = line_no + 2, "Skipping unparseable CSV row");
            continue;
        };

        if ndvi_raw == FILL_VALUE || evi_raw == FILL_VALUE {
            debug!(%date, "Skipping fill-value row");
            continue;
        }

        let observation = VegetationObservation::new(
            date,
            ndvi_raw * SCALE_FACTOR,
            evi_raw * SCALE_FACTOR,
            DataQuality::Measured,
        );

        if let Err(e) = observation.validate() {
            warn!(%date, error = %e, "Dropping out-of-range observation");
            continue;
        }

        observations.push(observation);
    }

    observations.sort_by_key(|o| o.date);
    debug!(observations = observations.len(), "Result CSV parsed");
    Ok(observations)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NDVI: &str = "_250m_16_days_NDVI";
    const EVI: &str = "_250m_16_days_EVI";

    fn csv(rows: &str) -> String {
        format!(
            "ID,Latitude,Longitude,Date,MOD13Q1_061{NDVI},MOD13Q1_061{EVI}\n{rows}"
        )
    }

    #[test]
    fn test_scale_factor_applied() {
        let data = csv("0,23.81,90.41,2025-07-04,6214,3830\n");
        let obs = parse_vegetation_csv(data.as_bytes(), NDVI, EVI).unwrap();

        assert_eq!(obs.len(), 1);
        assert!((obs[0].ndvi - 0.6214).abs() < 1e-12);
        assert!((obs[0].evi - 0.383).abs() < 1e-12);
        assert_eq!(obs[0].quality, DataQuality::Measured);
    }

    #[test]
    fn test_fill_rows_skipped() {
        let data = csv("0,23.81,90.41,2025-07-04,-3000,1200\n1,23.81,90.41,2025-07-20,5000,3000\n");
        let obs = parse_vegetation_csv(data.as_bytes(), NDVI, EVI).unwrap();

        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].date.to_string(), "2025-07-20");
    }

    #[test]
    fn test_rows_sorted_by_date() {
        let data = csv("0,23.81,90.41,2025-07-20,5000,3000\n1,23.81,90.41,2025-07-04,6000,3500\n");
        let obs = parse_vegetation_csv(data.as_bytes(), NDVI, EVI).unwrap();

        assert_eq!(obs[0].date.to_string(), "2025-07-04");
        assert_eq!(obs[1].date.to_string(), "2025-07-20");
    }

    #[test]
    fn test_missing_column_is_invalid_response() {
        let data = format!("ID,Date,MOD13Q1_061{NDVI}\n0,2025-07-04,6214\n");
        let result = parse_vegetation_csv(data.as_bytes(), NDVI, EVI);
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[test]
    fn test_unparseable_rows_skipped() {
        let data = csv("0,23.81,90.41,not-a-date,6214,3830\n1,23.81,90.41,2025-07-04,oops,3830\n");
        let obs = parse_vegetation_csv(data.as_bytes(), NDVI, EVI).unwrap();
        assert!(obs.is_empty());
    }

    #[test]
    fn test_non_utf8_is_invalid_response() {
        let result = parse_vegetation_csv(&[0xFF, 0xFE, 0x00], NDVI, EVI);
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[test]
    fn test_out_of_range_after_scaling_dropped() {
        // 20000 * 0.0001 = 2.0, outside the valid index range.
        let data = csv("0,23.81,90.41,2025-07-04,20000,3830\n");
        let obs = parse_vegetation_csv(data.as_bytes(), NDVI, EVI).unwrap();
        assert!(obs.is_empty());
    }
}
