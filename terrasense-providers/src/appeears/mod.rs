//! Vegetation-index provider: the AppEEARS task-based extraction API.
//!
//! Retrieval is an asynchronous workflow - submit a task, poll its status,
//! download and parse the result bundle - authenticated by a session token
//! obtained via a login call. Unlike the moisture path, failures here
//! escalate to the caller: vegetation-index consumers make stocking and
//! rotation decisions that must not silently degrade to guesses.

mod adapter;
mod api;
mod auth;
mod parser;

pub use adapter::AreaTaskAdapter;
pub use api::{AppearsClient, BundleFile};
pub use auth::SessionTokenState;
pub use parser::parse_vegetation_csv;
