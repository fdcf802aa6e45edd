// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Terrasense` Providers
//!
//! Provider adapters for the `Terrasense` retrieval pipeline, plus the
//! [`EarthDataService`] facade the rest of the application talks to.
//!
//! ## Soil moisture (point path)
//!
//! Three tiers, tried in order by the fallback pipeline:
//!
//! 1. [`cmr`] - primary catalog search (measured granule data)
//! 2. [`power`] - secondary modeled point API (scaled root-zone wetness)
//! 3. [`seasonal`] - deterministic local estimate, always produces
//!
//! This path never surfaces a provider error: drought and irrigation logic
//! must not be blocked by upstream unavailability, so it degrades through
//! the tiers and tags each point with its provenance.
//!
//! ## Vegetation index (area path)
//!
//! [`appeears`] drives the task-based extraction workflow: submit, poll to
//! completion, download and parse the result bundle. This path escalates
//! failures - silently fabricated greenness data would feed stocking and
//! rotation decisions.

pub mod appeears;
pub mod cmr;
pub mod power;
pub mod seasonal;
pub mod service;

pub use appeears::AreaTaskAdapter;
pub use cmr::CmrStrategy;
pub use power::PowerStrategy;
pub use seasonal::SeasonalStrategy;
pub use service::{EarthDataService, MoistureBackend, VegetationBackend};
