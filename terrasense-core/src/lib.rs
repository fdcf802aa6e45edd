// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Terrasense` Core
//!
//! Core types and models for the `Terrasense` Earth-observation pipeline.
//!
//! This crate provides the foundational abstractions used across all other
//! `Terrasense` crates, including:
//!
//! - Time-series models (points, quality tags, fetch requests)
//! - Geographic types (points of interest, polygons, bounding boxes)
//! - Asynchronous extraction-task state
//! - Derived assessment types (drought, irrigation, grazing, forecast)
//! - Error types
//!
//! ## Key Types
//!
//! ### Time Series
//! - [`TimeSeriesPoint`] - One dated observation with a quality tag
//! - [`DataQuality`] - Measured / modeled / estimated provenance
//! - [`FetchRequest`] - Location + date range + parameter set (cache key)
//! - [`CacheEntry`] - A stored series with its storage timestamp
//!
//! ### Geography
//! - [`AreaOfInterest`] - Point or polygon, reduced to a centroid
//! - [`BoundingBox`] - Search box around a point
//!
//! ### Extraction Tasks
//! - [`TaskStatus`] - Submitted / processing / done / error
//! - [`TaskSnapshot`] - Polled state of an extraction task
//!
//! ### Derived Assessments
//! - [`DroughtAssessment`] / [`DroughtLevel`]
//! - [`IrrigationPlan`], [`GrazingPlan`], [`MoisturePrediction`]
//! - [`TrendAnalysis`] / [`TrendDirection`]

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Geography
    AreaOfInterest,
    BoundingBox,
    // Time series
    CacheEntry,
    DataQuality,
    FetchRequest,
    TimeSeriesPoint,
    // Vegetation
    VegetationObservation,
    // Extraction tasks
    TaskSnapshot,
    TaskStatus,
    // Derived assessments
    DroughtAssessment,
    DroughtLevel,
    GrazingPlan,
    IrrigationPlan,
    MoisturePrediction,
    TrendAnalysis,
    TrendDirection,
};
