// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Terrasense` Analytics
//!
//! Pure agricultural analytics over already-fetched time series. Nothing in
//! this crate performs I/O, and nothing here fails on a non-empty series:
//! empty input yields an explicit "insufficient data" result instead of an
//! error, because callers may still want to render a UI state.
//!
//! Operations:
//!
//! - [`analyze_trend`] - least-squares trend over the most recent points
//! - [`detect_drought`] - six-band drought classification with
//!   recommendations
//! - [`grass_biomass`] - NDVI-based standing forage estimate
//! - [`irrigation_needs`] - water deficit, depth, and volume
//! - [`predict_moisture`] - seven-day linear moisture forecast
//! - [`grazing_rotation`] - rotation and rest schedule from pasture biomass

pub mod drought;
pub mod forage;
pub mod forecast;
pub mod irrigation;
pub mod trend;

pub use drought::detect_drought;
pub use forage::{grass_biomass, grazing_rotation};
pub use forecast::{predict_moisture, FORECAST_DAYS, RAIN_MM_TO_MOISTURE};
pub use irrigation::irrigation_needs;
pub use trend::{analyze_trend, linear_regression, TREND_WINDOW};
