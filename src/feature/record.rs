use super::geometry::{Geometry, Position};
use crate::types::{ID_PROPERTY, OSM_ID_PROPERTY, Properties, SpotId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeatureTag {
    #[default]
    Feature,
}

/// One parking spot, shaped as a GeoJSON `Feature`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub kind: FeatureTag,
    #[serde(default, deserialize_with = "id_from_json")]
    pub id: SpotId,
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "nullable_map")]
    pub properties: Properties,
    /// Foreign members, kept verbatim.
    #[serde(flatten)]
    pub foreign: Map<String, Value>,
}

impl Feature {
    /// Builds a feature with no identifier yet.
    #[must_use]
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            kind: FeatureTag::Feature,
            id: SpotId::new(),
            geometry,
            properties,
            foreign: Map::new(),
        }
    }

    /// Sets the identifier on the feature and mirrors it into `properties`.
    pub fn assign_id(&mut self, id: SpotId) {
        self.properties.insert(ID_PROPERTY.to_string(), Value::String(id.clone()));
        self.id = id;
    }

    /// Picks the identifier of a freshly loaded feature: the top-level id,
    /// then `properties.id`, then `properties["@id"]`, then one derived from
    /// the geometry. The result is written back through [`Self::assign_id`].
    pub fn settle_id(&mut self) -> &str {
        let resolved = if self.id.is_empty() {
            [ID_PROPERTY, OSM_ID_PROPERTY]
                .iter()
                .find_map(|k| self.properties.get(*k).and_then(scalar_text))
                .filter(|s| !s.is_empty())
                .or_else(|| self.geometry.anchor().map(|p: Position| p.spot_id()))
                .unwrap_or_default()
        } else {
            std::mem::take(&mut self.id)
        };
        self.assign_id(resolved);
        &self.id
    }

    /// Property value rendered as text, as used for filtering and reports.
    #[must_use]
    pub fn property_text(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(value_text)
    }
}

/// Stringifies a property value. Strings are returned as-is, numbers in
/// their shortest form (`12.0` reads as `12`), everything else as compact JSON.
#[must_use]
pub fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

fn id_from_json<'de, D: Deserializer<'de>>(d: D) -> Result<SpotId, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(scalar_text).unwrap_or_default())
}

fn nullable_map<'de, D: Deserializer<'de>>(d: D) -> Result<Properties, D::Error> {
    Ok(Option::<Properties>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settle_id_prefers_top_level_then_properties() {
        let mut f: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "id": "way/42",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"@id": "node/7"}
        }))
        .unwrap();
        assert_eq!(f.settle_id(), "way/42");
        assert_eq!(f.properties["id"], "way/42");

        let mut f: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"@id": "node/7"}
        }))
        .unwrap();
        assert_eq!(f.settle_id(), "node/7");

        let mut f: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": null
        }))
        .unwrap();
        assert_eq!(f.settle_id(), "1.000000_2.000000");
    }

    #[test]
    fn integral_floats_read_as_integers() {
        assert_eq!(value_text(&json!(12.0)), "12");
        assert_eq!(value_text(&json!(-0.0)), "0");
        assert_eq!(value_text(&json!(12.5)), "12.5");
        assert_eq!(value_text(&json!(12)), "12");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!(null)), "null");
    }

    #[test]
    fn foreign_members_survive_round_trip() {
        let raw = json!({
            "type": "Feature",
            "id": "a",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"capacity": 12},
            "bbox": [0, 0, 1, 1]
        });
        let f: Feature = serde_json::from_value(raw).unwrap();
        assert_eq!(f.foreign["bbox"], json!([0, 0, 1, 1]));
        assert_eq!(f.property_text("capacity").as_deref(), Some("12"));
        let back = serde_json::to_value(&f).unwrap();
        assert_eq!(back["bbox"], json!([0, 0, 1, 1]));
    }
}
