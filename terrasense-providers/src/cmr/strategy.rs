//! Catalog fallback tier.

use async_trait::async_trait;
use tracing::{debug, instrument};

use terrasense_core::FetchRequest;
use terrasense_fetch::{FetchError, MoistureStrategy, SourceTier, StrategyOutcome};

use super::api::CmrClient;
use super::parser::{parse_granules, SOURCE_ID};

/// Primary soil-moisture tier backed by the catalog search API.
pub struct CmrStrategy {
    client: CmrClient,
}

impl CmrStrategy {
    /// Creates the tier.
    pub fn new(client: CmrClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MoistureStrategy for CmrStrategy {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Catalog
    }

    #[instrument(skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Result<StrategyOutcome, FetchError> {
        let granules = self
            .client
            .search_granules(
                request.latitude,
                request.longitude,
                request.start,
                request.end,
            )
            .await?;

        if granules.is_empty() {
            debug!("No granules matched the search box");
            return Ok(StrategyOutcome::TryNext("no granules matched".to_string()));
        }

        let points = parse_granules(&granules);
        if points.is_empty() {
            debug!(
                granules = granules.len(),
                "Granules matched but carried no usable values"
            );
            return Ok(StrategyOutcome::TryNext(
                "no granules carried usable values".to_string(),
            ));
        }

        Ok(StrategyOutcome::Series(points))
    }
}
