//! POWER daily point client.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

use terrasense_fetch::{FetchError, HttpClient};
use terrasense_store::PowerSettings;

// ============================================================================
// API Response Types
// ============================================================================

/// Top-level daily point response.
#[derive(Debug, Deserialize)]
pub(crate) struct PowerResponse {
    /// GeoJSON-style properties wrapper.
    pub properties: PowerProperties,
}

/// Properties body.
#[derive(Debug, Deserialize)]
pub(crate) struct PowerProperties {
    /// Parameter name -> (YYYYMMDD -> value).
    #[serde(default)]
    pub parameter: HashMap<String, BTreeMap<String, f64>>,
}

// ============================================================================
// API Client
// ============================================================================

/// POWER daily point client. The API is open; no credential is needed.
#[derive(Debug, Clone)]
pub struct PowerClient {
    http: HttpClient,
    settings: PowerSettings,
}

impl PowerClient {
    /// Creates a client.
    pub fn new(http: HttpClient, settings: PowerSettings) -> Self {
        Self { http, settings }
    }

    /// Fetches the configured daily parameter for a point and date range.
    ///
    /// Returns `(date, raw value)` pairs in date order; the map is empty
    /// when the provider had no data for the window.
    ///
    /// # Errors
    ///
    /// Propagates the resilient client's classification.
    #[instrument(skip(self), fields(parameter = %self.settings.parameter))]
    pub async fn daily_point(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<String, f64>, FetchError> {
        let query = [
            ("parameters", self.settings.parameter.clone()),
            ("community", self.settings.community.clone()),
            ("latitude", format!("{latitude:.4}")),
            ("longitude", format!("{longitude:.4}")),
            ("start", start.format("%Y%m%d").to_string()),
            ("end", end.format("%Y%m%d").to_string()),
            ("format", "JSON".to_string()),
        ];

        debug!("Fetching modeled daily parameter");

        let response: PowerResponse = self
            .http
            .get_json(&self.settings.endpoint, &query, None)
            .await?;

        let values = response
            .properties
            .parameter
            .get(&self.settings.parameter)
            .cloned()
            .unwrap_or_default();

        debug!(days = values.len(), "Modeled fetch complete");
        Ok(values)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_daily_response() {
        let json = r#"{
            "properties": {
                "parameter": {
                    "GWETROOT": {
                        "20250701": 0.62,
                        "20250702": 0.65,
                        "20250703": -999.0
                    }
                }
            }
        }"#;

        let response: PowerResponse = serde_json::from_str(json).unwrap();
        let values = response.properties.parameter.get("GWETROOT").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values["20250701"], 0.62);
    }

    #[test]
    fn test_parse_missing_parameter() {
        let json = r#"{"properties": {"parameter": {}}}"#;
        let response: PowerResponse = serde_json::from_str(json).unwrap();
        assert!(response.properties.parameter.is_empty());
    }
}
