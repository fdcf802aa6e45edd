//! Secondary soil-moisture tier: POWER modeled point API.
//!
//! Requests a named daily root-zone-wetness parameter for the point and
//! scales it into the volumetric moisture range. Used when the catalog tier
//! finds nothing usable.

mod api;
mod parser;
mod strategy;

pub use api::PowerClient;
pub use parser::scale_wetness_series;
pub use strategy::PowerStrategy;
