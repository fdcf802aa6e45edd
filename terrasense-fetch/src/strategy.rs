//! Fallback strategy trait and types.
//!
//! A strategy represents one tier of the soil-moisture fallback chain:
//! catalog search, modeled fallback, or synthetic estimate. Tiers are tried
//! in order by the pipeline, each returning either a series or a "try next"
//! signal, so every tier is testable on its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use terrasense_core::{FetchRequest, TimeSeriesPoint};

use crate::error::FetchError;

// ============================================================================
// Source Tier
// ============================================================================

/// The tier a strategy occupies in the fallback chain.
///
/// Ordering matters: tiers are tried best-fidelity first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    /// Primary catalog search (measured data).
    Catalog,
    /// Secondary modeled-data provider.
    Modeled,
    /// Deterministic local estimate. Must never fail.
    Synthetic,
}

impl SourceTier {
    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::Modeled => "Modeled",
            Self::Synthetic => "Synthetic",
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Strategy Outcome
// ============================================================================

/// What one tier produced for a request.
#[derive(Debug, Clone)]
pub enum StrategyOutcome {
    /// A usable series; the pipeline stops here.
    Series(Vec<TimeSeriesPoint>),
    /// Nothing usable (e.g. zero granules matched); try the next tier.
    TryNext(String),
}

// ============================================================================
// Moisture Strategy Trait
// ============================================================================

/// One tier of the soil-moisture fallback chain.
///
/// ## Implementing a Strategy
///
/// ```ignore
/// struct CatalogStrategy { client: CmrClient }
///
/// #[async_trait]
/// impl MoistureStrategy for CatalogStrategy {
///     fn id(&self) -> &str {
///         "smap.cmr"
///     }
///
///     fn tier(&self) -> SourceTier {
///         SourceTier::Catalog
///     }
///
///     async fn fetch(&self, request: &FetchRequest) -> Result<StrategyOutcome, FetchError> {
///         let granules = self.client.search_granules(request).await?;
///         // Parse granules or signal TryNext
///     }
/// }
/// ```
#[async_trait]
pub trait MoistureStrategy: Send + Sync {
    /// Unique identifier for this strategy (e.g. "smap.cmr").
    fn id(&self) -> &str;

    /// The tier this strategy occupies.
    fn tier(&self) -> SourceTier;

    /// Human-readable name for this strategy.
    fn display_name(&self) -> String {
        format!("{} ({})", self.id(), self.tier().display_name())
    }

    /// Attempts to produce a series for the request.
    ///
    /// Returning `Ok(TryNext)` means the tier ran but found nothing usable;
    /// returning `Err` means the tier failed. The pipeline treats both as a
    /// fall-through to the next tier.
    async fn fetch(&self, request: &FetchRequest) -> Result<StrategyOutcome, FetchError>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_display() {
        assert_eq!(SourceTier::Catalog.display_name(), "Catalog");
        assert_eq!(SourceTier::Synthetic.to_string(), "Synthetic");
    }

    #[test]
    fn test_tier_ordering() {
        assert!(SourceTier::Catalog < SourceTier::Modeled);
        assert!(SourceTier::Modeled < SourceTier::Synthetic);
    }
}
