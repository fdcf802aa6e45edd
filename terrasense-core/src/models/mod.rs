//! Domain models for `Terrasense`.
//!
//! This module contains the core data structures representing fetched time
//! series, geographic inputs, asynchronous extraction tasks, and the derived
//! agricultural assessments computed from them.
//!
//! ## Submodules
//!
//! - [`timeseries`] - Time-series types (`TimeSeriesPoint`, `FetchRequest`, `CacheEntry`)
//! - [`location`] - Geographic types (`AreaOfInterest`, `BoundingBox`)
//! - [`task`] - Extraction-task state (`TaskStatus`, `TaskSnapshot`)
//! - [`vegetation`] - Vegetation-index observations
//! - [`assessment`] - Derived assessments (drought, irrigation, grazing, forecast)

mod assessment;
mod location;
mod task;
mod timeseries;
mod vegetation;

// Re-export everything at the models level
pub use assessment::{
    DroughtAssessment, DroughtLevel, GrazingPlan, IrrigationPlan, MoisturePrediction,
    TrendAnalysis, TrendDirection,
};
pub use location::{AreaOfInterest, BoundingBox};
pub use task::{TaskSnapshot, TaskStatus};
pub use timeseries::{CacheEntry, DataQuality, FetchRequest, TimeSeriesPoint};
pub use vegetation::VegetationObservation;
