use super::core::FeatureStore;
use super::filter::{SpotFilter, known_property_keys};
use super::stats::{FieldSummary, summarize};
use crate::errors::StoreError;
use crate::feature::{Feature, Geometry};
use crate::types::{Properties, SpotId, is_mutable_field};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Candidate for a new parking spot, as received from a caller. The geometry
/// stays raw until [`FeatureStore::create`] validates it.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SpotDraft {
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default, deserialize_with = "nullable_properties")]
    pub properties: Properties,
}

impl SpotDraft {
    #[must_use]
    pub fn point(lon: f64, lat: f64) -> Self {
        Self {
            geometry: Some(serde_json::json!({"type": "Point", "coordinates": [lon, lat]})),
            properties: Properties::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Turn the raw geometry into a typed, range-checked [`Geometry`].
    ///
    /// # Errors
    /// [`StoreError::InvalidGeometry`] when the geometry or its coordinates
    /// are missing, malformed, or out of range.
    pub fn parse_geometry(&self) -> Result<Geometry, StoreError> {
        let raw = match &self.geometry {
            Some(Value::Object(obj)) => obj,
            Some(Value::Null) | None => {
                return Err(StoreError::InvalidGeometry("geometry is missing".into()));
            }
            Some(_) => return Err(StoreError::InvalidGeometry("geometry must be an object".into())),
        };
        if raw.get("coordinates").is_none_or(Value::is_null) {
            return Err(StoreError::InvalidGeometry("coordinates are missing".into()));
        }
        let geometry: Geometry = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|e| StoreError::InvalidGeometry(e.to_string()))?;
        geometry.validate().map_err(StoreError::InvalidGeometry)?;
        Ok(geometry)
    }
}

fn nullable_properties<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Properties, D::Error> {
    Ok(Option::<Properties>::deserialize(d)?.unwrap_or_default())
}

impl FeatureStore {
    /// Features whose properties satisfy every term of `filter`, in
    /// collection order.
    ///
    /// # Errors
    /// [`StoreError::InvalidFilter`] if a filter key occurs on no feature.
    pub fn list(&self, filter: &SpotFilter) -> Result<Vec<Feature>, StoreError> {
        let snapshot = self.snapshot();
        if !filter.is_empty() {
            filter.check_keys(&known_property_keys(&snapshot.features))?;
        }
        Ok(snapshot.features.iter().filter(|f| filter.matches(f)).cloned().collect())
    }

    /// # Errors
    /// [`StoreError::NotFound`] if no feature has this id.
    pub fn get(&self, id: &str) -> Result<Feature, StoreError> {
        self.snapshot().get(id).cloned().ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Property keys that may currently be used as filters.
    #[must_use]
    pub fn known_keys(&self) -> BTreeSet<String> {
        known_property_keys(&self.snapshot().features)
    }

    /// Value frequencies for the given property fields.
    #[must_use]
    pub fn field_summary(&self, fields: &[&str]) -> FieldSummary {
        summarize(&self.snapshot().features, fields)
    }

    /// Register a new parking spot. Its id is derived from its position, so
    /// the same spot cannot be registered twice.
    ///
    /// Only `Point` geometries can be created.
    ///
    /// # Errors
    /// [`StoreError::InvalidGeometry`], [`StoreError::DuplicateId`],
    /// [`StoreError::Persist`] or [`StoreError::Busy`].
    pub fn create(&self, draft: SpotDraft) -> Result<SpotId, StoreError> {
        let geometry = draft.parse_geometry()?;
        let Geometry::Point { coordinates } = &geometry else {
            return Err(StoreError::InvalidGeometry(format!(
                "only Point geometries can be created, got {}",
                geometry.kind()
            )));
        };
        let id = coordinates.spot_id();
        let mut feature = Feature::new(geometry, draft.properties);
        feature.assign_id(id.clone());
        self.mutate(move |collection| {
            if collection.contains(&id) {
                return Err(StoreError::DuplicateId(id));
            }
            collection.features.push(feature);
            Ok(id)
        })
    }

    /// Apply the whitelisted subset of `patch` to one feature and return
    /// exactly the fields that were written.
    ///
    /// # Errors
    /// [`StoreError::NoUpdatableFields`], [`StoreError::NotFound`],
    /// [`StoreError::Persist`] or [`StoreError::Busy`].
    pub fn update(
        &self,
        id: &str,
        patch: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        let changes: BTreeMap<String, String> = patch
            .iter()
            .filter(|(k, _)| is_mutable_field(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if changes.is_empty() {
            return Err(StoreError::NoUpdatableFields);
        }
        self.mutate(|collection| {
            let feature =
                collection.get_mut(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            for (key, value) in &changes {
                feature.properties.insert(key.clone(), Value::String(value.clone()));
            }
            Ok(changes)
        })
    }

    /// # Errors
    /// [`StoreError::NotFound`], [`StoreError::Persist`] or [`StoreError::Busy`].
    pub fn delete(&self, id: &str) -> Result<SpotId, StoreError> {
        self.mutate(|collection| {
            let index =
                collection.position(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            Ok(collection.features.remove(index).id)
        })
    }
}
