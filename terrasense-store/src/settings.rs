//! Settings persistence.
//!
//! Endpoints, credentials, and tuning constants for the retrieval pipeline.
//! Settings load from a JSON file with environment overrides for secrets,
//! and the saved file gets restrictive permissions because it can hold an
//! Earthdata token.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{
    default_cache_dir, default_config_dir, load_json_or_default, save_json,
    set_restrictive_permissions,
};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable carrying the Earthdata bearer token.
const EARTHDATA_TOKEN_ENV: &str = "EARTHDATA_TOKEN";

/// Environment variables carrying AppEEARS login credentials.
const APPEEARS_USERNAME_ENV: &str = "APPEEARS_USERNAME";
const APPEEARS_PASSWORD_ENV: &str = "APPEEARS_PASSWORD";

// ============================================================================
// Provider Settings
// ============================================================================

/// Catalog search (CMR) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmrSettings {
    /// Granule search endpoint.
    pub endpoint: String,
    /// Collection short name.
    pub short_name: String,
    /// Collection version.
    pub version: String,
    /// Page size for granule queries.
    pub page_size: u32,
    /// Half-width of the search box around a point, in degrees.
    pub bbox_half_width: f64,
}

impl Default for CmrSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://cmr.earthdata.nasa.gov/search/granules.json".to_string(),
            short_name: "SPL3SMP_E".to_string(),
            version: "005".to_string(),
            page_size: 100,
            bbox_half_width: 0.1,
        }
    }
}

/// Modeled point API (POWER) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSettings {
    /// Daily point endpoint.
    pub endpoint: String,
    /// POWER community identifier.
    pub community: String,
    /// Named daily parameter used as the moisture proxy.
    pub parameter: String,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://power.larc.nasa.gov/api/temporal/daily/point".to_string(),
            community: "AG".to_string(),
            parameter: "GWETROOT".to_string(),
        }
    }
}

/// Task-based extraction API (AppEEARS) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearsSettings {
    /// API base URL.
    pub endpoint: String,
    /// Login username; `APPEEARS_USERNAME` overrides.
    pub username: Option<String>,
    /// Login password; `APPEEARS_PASSWORD` overrides.
    pub password: Option<String>,
    /// Product identifier for vegetation-index layers.
    pub product: String,
    /// NDVI layer name.
    pub ndvi_layer: String,
    /// EVI layer name.
    pub evi_layer: String,
}

impl Default for AppearsSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://appeears.earthdatacloud.nasa.gov/api".to_string(),
            username: None,
            password: None,
            product: "MOD13Q1.061".to_string(),
            ndvi_layer: "_250m_16_days_NDVI".to_string(),
            evi_layer: "_250m_16_days_EVI".to_string(),
        }
    }
}

// ============================================================================
// Tuning Settings
// ============================================================================

/// Retry, polling, and domain constants.
///
/// The root depth and wetness scale mirror the values the product has always
/// used; their accuracy is unverified, which is why they are configuration
/// rather than literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningSettings {
    /// Maximum HTTP attempts per logical fetch.
    pub max_attempts: u32,
    /// Base retry delay in seconds.
    pub base_delay_secs: u64,
    /// Seconds between task status polls.
    pub poll_interval_secs: u64,
    /// Maximum number of status polls before timeout.
    pub max_polls: u32,
    /// Assumed root depth in centimetres for irrigation depth.
    pub root_depth_cm: f64,
    /// Scale mapping root-zone wetness onto volumetric moisture.
    pub wetness_scale: f64,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1,
            poll_interval_secs: 10,
            max_polls: 60,
            root_depth_cm: 30.0,
            wetness_scale: 0.4,
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Complete pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory for cached series.
    pub cache_dir: PathBuf,
    /// Earthdata bearer token; `EARTHDATA_TOKEN` overrides. The catalog
    /// tier runs in degraded anonymous mode without one.
    pub earthdata_token: Option<String>,
    /// Catalog search settings.
    pub cmr: CmrSettings,
    /// Modeled point API settings.
    pub power: PowerSettings,
    /// Extraction API settings.
    pub appeears: AppearsSettings,
    /// Retry, polling, and domain constants.
    pub tuning: TuningSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir().join("series"),
            earthdata_token: None,
            cmr: CmrSettings::default(),
            power: PowerSettings::default(),
            appeears: AppearsSettings::default(),
            tuning: TuningSettings::default(),
        }
    }
}

impl Settings {
    /// Returns the default settings file path.
    pub fn default_path() -> PathBuf {
        default_config_dir().join("settings.json")
    }

    /// Loads settings from a file, falling back to defaults, then applies
    /// environment overrides.
    pub async fn load_or_default(path: &Path) -> Self {
        let mut settings: Self = load_json_or_default(path).await;
        settings.apply_env_overrides();
        debug!(path = %path.display(), "Settings loaded");
        settings
    }

    /// Saves settings with restrictive file permissions.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on serialization or filesystem failure.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        set_restrictive_permissions(path).await?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Applies environment-variable overrides for secrets.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(EARTHDATA_TOKEN_ENV) {
            if !token.is_empty() {
                debug!(source = "env", "Using Earthdata token override");
                self.earthdata_token = Some(token);
            }
        }
        if let Ok(user) = std::env::var(APPEEARS_USERNAME_ENV) {
            if !user.is_empty() {
                self.appeears.username = Some(user);
            }
        }
        if let Ok(pass) = std::env::var(APPEEARS_PASSWORD_ENV) {
            if !pass.is_empty() {
                self.appeears.password = Some(pass);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.cmr.short_name, "SPL3SMP_E");
        assert_eq!(s.power.parameter, "GWETROOT");
        assert_eq!(s.appeears.product, "MOD13Q1.061");
        assert_eq!(s.tuning.max_attempts, 3);
        assert!((s.tuning.wetness_scale - 0.4).abs() < f64::EPSILON);
        assert!((s.tuning.root_depth_cm - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.cmr.page_size = 25;
        settings.save(&path).await.unwrap();

        let loaded = Settings::load_or_default(&path).await;
        assert_eq!(loaded.cmr.page_size, 25);
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_or_default(&dir.path().join("none.json")).await;
        assert_eq!(loaded.tuning.max_polls, 60);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Settings = serde_json::from_str(r#"{"cmr": {"page_size": 10}}"#).unwrap();
        assert_eq!(parsed.cmr.page_size, 10);
        assert_eq!(parsed.cmr.short_name, "SPL3SMP_E");
        assert_eq!(parsed.tuning.max_attempts, 3);
    }
}
