use serde_json::{Map, Value};

pub type SpotId = String;

/// Open property map of a feature. Values are usually strings but imported
/// data may carry any JSON scalar, which is preserved as-is.
pub type Properties = Map<String, Value>;

/// Property keys a caller may change after creation.
pub const MUTABLE_FIELDS: [&str; 4] = ["name", "access", "fee", "surface"];

/// Key under which the identifier is mirrored inside `properties`.
pub const ID_PROPERTY: &str = "id";

/// Identifier key used by OpenStreetMap exports.
pub const OSM_ID_PROPERTY: &str = "@id";

/// Fields reported by a field summary when none are requested.
pub const DEFAULT_SUMMARY_FIELDS: [&str; 7] =
    ["surface", "access", "fee", "capacity", "maxstay", "operator", "supervised"];

#[must_use]
pub fn is_mutable_field(key: &str) -> bool {
    MUTABLE_FIELDS.contains(&key)
}
