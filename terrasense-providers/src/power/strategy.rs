//! Modeled fallback tier.

use async_trait::async_trait;
use tracing::{debug, instrument};

use terrasense_core::FetchRequest;
use terrasense_fetch::{FetchError, MoistureStrategy, SourceTier, StrategyOutcome};

use super::api::PowerClient;
use super::parser::{scale_wetness_series, SOURCE_ID};

/// Secondary soil-moisture tier backed by the modeled point API.
pub struct PowerStrategy {
    client: PowerClient,
    wetness_scale: f64,
}

impl PowerStrategy {
    /// Creates the tier with the configured wetness-to-moisture scale.
    pub fn new(client: PowerClient, wetness_scale: f64) -> Self {
        Self {
            client,
            wetness_scale,
        }
    }
}

#[async_trait]
impl MoistureStrategy for PowerStrategy {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Modeled
    }

    #[instrument(skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Result<StrategyOutcome, FetchError> {
        let raw = self
            .client
            .daily_point(
                request.latitude,
                request.longitude,
                request.start,
                request.end,
            )
            .await?;

        let series = scale_wetness_series(&raw, self.wetness_scale);
        if series.is_empty() {
            debug!("Modeled provider returned no usable days");
            return Ok(StrategyOutcome::TryNext(
                "modeled provider returned no data".to_string(),
            ));
        }

        Ok(StrategyOutcome::Series(series))
    }
}
