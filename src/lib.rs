pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod feature;
pub mod fsutil;
pub mod logger;
pub mod store;
pub mod types;

pub use errors::StoreError;
pub use feature::{Feature, FeatureCollection, Geometry, Position};
pub use store::{FeatureStore, SpotDraft, SpotFilter, StoreOptions};

/// Initializes process-wide logging from `FINDSPOT_LOG_*` variables.
///
/// Call once before any other operation; later calls keep the first setup.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::configure_from_env()?;
    Ok(())
}
