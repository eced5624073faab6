//! The feature store: owner of the parking spot collection and its backing document.
mod core;
mod filter;
mod ops;
mod persist;
mod stats;

pub use self::core::{FeatureStore, StoreOptions};
pub use filter::{SpotFilter, known_property_keys};
pub use ops::SpotDraft;
pub use persist::{JsonFileStorage, MemoryStorage, SnapshotStorage};
pub use stats::{FieldCounts, FieldSummary, ValueCount, summarize};
