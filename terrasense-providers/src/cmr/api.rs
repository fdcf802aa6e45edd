//! CMR granule search client.

use serde::Deserialize;
use tracing::{debug, instrument};

use chrono::NaiveDate;
use terrasense_core::BoundingBox;
use terrasense_fetch::{FetchError, HttpClient};
use terrasense_store::CmrSettings;

// ============================================================================
// API Response Types
// ============================================================================

/// Top-level granule search response.
#[derive(Debug, Deserialize)]
pub(crate) struct CmrResponse {
    /// Atom feed wrapper.
    pub feed: CmrFeed,
}

/// Feed body.
#[derive(Debug, Deserialize)]
pub(crate) struct CmrFeed {
    /// Matching granules; absent when nothing matched.
    #[serde(default)]
    pub entry: Vec<CmrGranule>,
}

/// One catalog granule.
#[derive(Debug, Clone, Deserialize)]
pub struct CmrGranule {
    /// Granule identifier.
    #[serde(default)]
    pub id: Option<String>,

    /// Granule title.
    #[serde(default)]
    pub title: Option<String>,

    /// Start of the granule's temporal extent, RFC 3339.
    #[serde(default)]
    pub time_start: Option<String>,

    /// Granule-level metadata attributes, when the collection carries them.
    #[serde(default)]
    pub additional_attributes: Vec<CmrAttribute>,
}

/// One granule-level attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct CmrAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute values as strings.
    #[serde(default)]
    pub values: Vec<String>,
}

// ============================================================================
// API Client
// ============================================================================

/// CMR granule search client.
#[derive(Debug, Clone)]
pub struct CmrClient {
    http: HttpClient,
    settings: CmrSettings,
    token: Option<String>,
}

impl CmrClient {
    /// Creates a client. The bearer token is optional; without one the
    /// search runs anonymously.
    pub fn new(http: HttpClient, settings: CmrSettings, token: Option<String>) -> Self {
        Self {
            http,
            settings,
            token,
        }
    }

    /// Searches for granules in a box around the point over the date range.
    ///
    /// # Errors
    ///
    /// Propagates the resilient client's classification: terminal request
    /// errors, authentication failures, or a transient failure after the
    /// retry budget.
    #[instrument(skip(self), fields(short_name = %self.settings.short_name))]
    pub async fn search_granules(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CmrGranule>, FetchError> {
        let bbox = BoundingBox::around(latitude, longitude, self.settings.bbox_half_width);
        let temporal = format!("{start}T00:00:00Z,{end}T23:59:59Z");

        let query = [
            ("short_name", self.settings.short_name.clone()),
            ("version", self.settings.version.clone()),
            ("bounding_box", bbox.to_query()),
            ("temporal", temporal),
            ("page_size", self.settings.page_size.to_string()),
        ];

        debug!(bbox = %bbox.to_query(), "Searching catalog granules");

        let response: CmrResponse = self
            .http
            .get_json(&self.settings.endpoint, &query, self.token.as_deref())
            .await?;

        debug!(granules = response.feed.entry.len(), "Catalog search complete");
        Ok(response.feed.entry)
    }
}

// ============================================================================
// Tests
// ============================================================================
