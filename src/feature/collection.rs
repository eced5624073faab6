use super::record::Feature;
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// The backing document: every parking spot, in insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: CollectionTag,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub foreign: Map<String, Value>,
}

impl FeatureCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The GeoJSON type tag of the document.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.kind {
            CollectionTag::FeatureCollection => "FeatureCollection",
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.features.iter().position(|f| f.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    /// Brings a freshly loaded document in line with the store invariants:
    /// every geometry in range, every feature carrying an id mirrored into
    /// its properties, and no id used twice.
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupt`] describing the first offending feature.
    pub fn settle(&mut self) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(self.features.len());
        for (i, feature) in self.features.iter_mut().enumerate() {
            feature
                .geometry
                .validate()
                .map_err(|e| StoreError::Corrupt(format!("feature #{i}: {e}")))?;
            let id = feature.settle_id();
            if id.is_empty() {
                return Err(StoreError::Corrupt(format!("feature #{i} has no usable id")));
            }
            if !seen.insert(id.to_string()) {
                return Err(StoreError::Corrupt(format!("duplicate id {id}")));
            }
        }
        Ok(())
    }
}
