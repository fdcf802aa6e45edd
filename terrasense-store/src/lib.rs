// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Terrasense` Store
//!
//! Durable local state for the `Terrasense` pipeline.
//!
//! This crate provides:
//!
//! - **[`SeriesStore`]**: key/value persistence of fetched time series, one
//!   JSON file per cache key, with caller-driven overwrite and no implicit
//!   expiry
//! - **[`Settings`]**: provider endpoints, credentials, and tuning constants
//!   with JSON persistence and environment overrides
//! - **Persistence helpers**: atomic JSON file I/O
//!
//! ## Usage
//!
//! ```ignore
//! use terrasense_store::{SeriesStore, Settings};
//!
//! let settings = Settings::load_or_default(&Settings::default_path()).await;
//! let store = SeriesStore::new(&settings.cache_dir);
//!
//! if let Some(entry) = store.get::<TimeSeriesPoint>(&key).await? {
//!     return Ok(entry.series);
//! }
//! ```

pub mod error;
pub mod persistence;
pub mod series_store;
pub mod settings;

pub use error::StoreError;
pub use persistence::{default_cache_dir, load_json, save_json};
pub use series_store::SeriesStore;
pub use settings::{AppearsSettings, CmrSettings, PowerSettings, Settings, TuningSettings};
