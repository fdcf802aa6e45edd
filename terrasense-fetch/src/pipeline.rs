//! Fallback pipeline for the soil-moisture tiers.
//!
//! The pipeline takes an ordered list of [`MoistureStrategy`] tiers and runs
//! them in sequence until one yields a non-empty series. A tier that errors
//! (of any class - moisture consumers must never be blocked by upstream
//! unavailability) or signals try-next falls through to the next tier with a
//! logged trace of the failure class.

use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use terrasense_core::{FetchRequest, TimeSeriesPoint};

use crate::error::FetchError;
use crate::strategy::{MoistureStrategy, SourceTier, StrategyOutcome};

// ============================================================================
// Tier Attempt
// ============================================================================

/// Record of a single tier attempt.
#[derive(Debug, Clone)]
pub struct TierAttempt {
    /// The strategy that was attempted.
    pub strategy_id: String,
    /// Its tier.
    pub tier: SourceTier,
    /// Whether the tier produced the final series.
    pub success: bool,
    /// Failure or try-next detail when it did not.
    pub detail: Option<String>,
    /// How long the attempt took.
    pub duration: Duration,
}

impl TierAttempt {
    fn success(strategy_id: impl Into<String>, tier: SourceTier, duration: Duration) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            tier,
            success: true,
            detail: None,
            duration,
        }
    }

    fn failure(
        strategy_id: impl Into<String>,
        tier: SourceTier,
        detail: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            tier,
            success: false,
            detail: Some(detail.into()),
            duration,
        }
    }
}

// ============================================================================
// Pipeline Outcome
// ============================================================================

/// The result of a pipeline execution.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The produced series, ordered by date.
    pub series: Vec<TimeSeriesPoint>,
    /// The tier that produced it.
    pub tier: SourceTier,
    /// The strategy that produced it.
    pub strategy_id: String,
    /// All attempts made, in order.
    pub attempts: Vec<TierAttempt>,
}

impl PipelineOutcome {
    /// Returns the number of tiers that were tried.
    pub fn attempts_count(&self) -> usize {
        self.attempts.len()
    }

    /// Returns true if the series came from a tier below the primary.
    pub fn is_degraded(&self) -> bool {
        self.tier != SourceTier::Catalog
    }
}

// ============================================================================
// Fallback Pipeline
// ============================================================================

/// An ordered chain of moisture tiers.
///
/// Production wiring ends with the synthetic tier, which always produces, so
/// `execute` only fails if the pipeline was assembled without one.
pub struct FallbackPipeline {
    strategies: Vec<Box<dyn MoistureStrategy>>,
}

impl FallbackPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Creates a pipeline with the given tiers, sorted best-fidelity first.
    pub fn with_strategies(strategies: Vec<Box<dyn MoistureStrategy>>) -> Self {
        let mut pipeline = Self { strategies };
        pipeline.sort_by_tier();
        pipeline
    }

    /// Adds a tier to the pipeline.
    pub fn add_strategy(&mut self, strategy: Box<dyn MoistureStrategy>) {
        self.strategies.push(strategy);
        self.sort_by_tier();
    }

    fn sort_by_tier(&mut self) {
        self.strategies.sort_by_key(|s| s.tier());
    }

    /// Returns the number of tiers in the pipeline.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if the pipeline has no tiers.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Executes the chain, trying tiers in order until one produces.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::AllTiersExhausted` only when every tier failed
    /// or signalled try-next, which production wiring prevents by ending the
    /// chain with the synthetic tier.
    #[instrument(skip(self, request), fields(tiers = self.strategies.len(), key = %request.cache_key()))]
    pub async fn execute(&self, request: &FetchRequest) -> Result<PipelineOutcome, FetchError> {
        let mut attempts = Vec::new();

        info!(tiers = self.strategies.len(), "Executing fallback chain");

        for strategy in &self.strategies {
            let strategy_id = strategy.id().to_string();
            let tier = strategy.tier();
            let attempt_start = Instant::now();

            debug!(strategy = %strategy_id, tier = %tier, "Trying tier");

            match strategy.fetch(request).await {
                Ok(StrategyOutcome::Series(series)) if !series.is_empty() => {
                    let duration = attempt_start.elapsed();
                    info!(
                        strategy = %strategy_id,
                        tier = %tier,
                        points = series.len(),
                        duration = ?duration,
                        "Tier produced series"
                    );
                    attempts.push(TierAttempt::success(&strategy_id, tier, duration));
                    return Ok(PipelineOutcome {
                        series,
                        tier,
                        strategy_id,
                        attempts,
                    });
                }
                Ok(StrategyOutcome::Series(_)) => {
                    let duration = attempt_start.elapsed();
                    debug!(strategy = %strategy_id, "Tier returned empty series");
                    attempts.push(TierAttempt::failure(
                        &strategy_id,
                        tier,
                        "empty series",
                        duration,
                    ));
                }
                Ok(StrategyOutcome::TryNext(reason)) => {
                    let duration = attempt_start.elapsed();
                    debug!(strategy = %strategy_id, reason = %reason, "Tier signalled try-next");
                    attempts.push(TierAttempt::failure(&strategy_id, tier, reason, duration));
                }
                Err(error) => {
                    let duration = attempt_start.elapsed();
                    warn!(
                        strategy = %strategy_id,
                        tier = %tier,
                        class = error.class(),
                        error = %error,
                        "Tier failed, falling through"
                    );
                    attempts.push(TierAttempt::failure(
                        &strategy_id,
                        tier,
                        error.to_string(),
                        duration,
                    ));
                }
            }
        }

        warn!("All fallback tiers exhausted");
        Err(FetchError::AllTiersExhausted)
    }
}

impl Default for FallbackPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use terrasense_core::DataQuality;

    fn request() -> FetchRequest {
        FetchRequest::new(
            23.81,
            90.41,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 3).unwrap(),
            "soil_moisture",
        )
    }

    fn point(value: f64, source: &str) -> TimeSeriesPoint {
        TimeSeriesPoint::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            value,
            DataQuality::Modeled,
            source,
        )
    }

    struct SeriesStrategy {
        id: String,
        tier: SourceTier,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl MoistureStrategy for SeriesStrategy {
        fn id(&self) -> &str {
            &self.id
        }

        fn tier(&self) -> SourceTier {
            self.tier
        }

        async fn fetch(&self, _request: &FetchRequest) -> Result<StrategyOutcome, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StrategyOutcome::Series(vec![point(0.3, &self.id)]))
        }
    }

    struct TryNextStrategy {
        tier: SourceTier,
    }

    #[async_trait]
    impl MoistureStrategy for TryNextStrategy {
        fn id(&self) -> &str {
            "test.empty"
        }

        fn tier(&self) -> SourceTier {
            self.tier
        }

        async fn fetch(&self, _request: &FetchRequest) -> Result<StrategyOutcome, FetchError> {
            Ok(StrategyOutcome::TryNext("no granules".to_string()))
        }
    }

    struct FailingStrategy {
        tier: SourceTier,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl MoistureStrategy for FailingStrategy {
        fn id(&self) -> &str {
            "test.fail"
        }

        fn tier(&self) -> SourceTier {
            self.tier
        }

        async fn fetch(&self, _request: &FetchRequest) -> Result<StrategyOutcome, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::TransientProvider {
                reason: "HTTP 503".to_string(),
                attempts: 3,
            })
        }
    }

    #[tokio::test]
    async fn test_empty_pipeline_exhausts() {
        let pipeline = FallbackPipeline::new();
        let outcome = pipeline.execute(&request()).await;
        assert!(matches!(outcome, Err(FetchError::AllTiersExhausted)));
    }

    #[tokio::test]
    async fn test_first_tier_wins() {
        let calls = Arc::new(AtomicU32::new(0));
        let pipeline = FallbackPipeline::with_strategies(vec![
            Box::new(SeriesStrategy {
                id: "test.catalog".to_string(),
                tier: SourceTier::Catalog,
                calls: calls.clone(),
            }),
            Box::new(SeriesStrategy {
                id: "test.modeled".to_string(),
                tier: SourceTier::Modeled,
                calls: Arc::new(AtomicU32::new(0)),
            }),
        ]);

        let outcome = pipeline.execute(&request()).await.unwrap();
        assert_eq!(outcome.strategy_id, "test.catalog");
        assert_eq!(outcome.tier, SourceTier::Catalog);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.attempts_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_try_next_falls_through() {
        let pipeline = FallbackPipeline::with_strategies(vec![
            Box::new(TryNextStrategy {
                tier: SourceTier::Catalog,
            }),
            Box::new(SeriesStrategy {
                id: "test.modeled".to_string(),
                tier: SourceTier::Modeled,
                calls: Arc::new(AtomicU32::new(0)),
            }),
        ]);

        let outcome = pipeline.execute(&request()).await.unwrap();
        assert_eq!(outcome.strategy_id, "test.modeled");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.attempts_count(), 2);
        assert_eq!(outcome.attempts[0].detail.as_deref(), Some("no granules"));
    }

    #[tokio::test]
    async fn test_exhausted_retries_invoke_fallback_exactly_once() {
        let failing_calls = Arc::new(AtomicU32::new(0));
        let fallback_calls = Arc::new(AtomicU32::new(0));
        let pipeline = FallbackPipeline::with_strategies(vec![
            Box::new(FailingStrategy {
                tier: SourceTier::Catalog,
                calls: failing_calls.clone(),
            }),
            Box::new(SeriesStrategy {
                id: "test.modeled".to_string(),
                tier: SourceTier::Modeled,
                calls: fallback_calls.clone(),
            }),
        ]);

        let outcome = pipeline.execute(&request()).await.unwrap();
        assert_eq!(outcome.tier, SourceTier::Modeled);
        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tiers_sorted_best_fidelity_first() {
        // Deliberately inserted out of order.
        let pipeline = FallbackPipeline::with_strategies(vec![
            Box::new(SeriesStrategy {
                id: "test.synthetic".to_string(),
                tier: SourceTier::Synthetic,
                calls: Arc::new(AtomicU32::new(0)),
            }),
            Box::new(SeriesStrategy {
                id: "test.catalog".to_string(),
                tier: SourceTier::Catalog,
                calls: Arc::new(AtomicU32::new(0)),
            }),
        ]);

        let outcome = pipeline.execute(&request()).await.unwrap();
        assert_eq!(outcome.strategy_id, "test.catalog");
    }
}
