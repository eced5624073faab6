//! GeoJSON-shaped parking spot model shared by the store, the HTTP layer and the CLI.
mod collection;
mod geometry;
mod record;

pub use collection::{CollectionTag, FeatureCollection};
pub use geometry::{Geometry, ID_PRECISION, LATITUDE_RANGE, LONGITUDE_RANGE, Position};
pub use record::{Feature, FeatureTag, value_text};
