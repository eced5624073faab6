use crate::errors::StoreError;
use crate::feature::{Feature, value_text};
use std::collections::{BTreeMap, BTreeSet};

/// Equality constraints on feature properties, compared case-insensitively
/// after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpotFilter {
    terms: BTreeMap<String, String>,
}

impl SpotFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a constraint. A later value for the same key replaces the earlier one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.terms.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Rejects every key that no feature carries.
    ///
    /// # Errors
    /// [`StoreError::InvalidFilter`] listing the unknown keys in sorted order.
    pub fn check_keys(&self, known: &BTreeSet<String>) -> Result<(), StoreError> {
        let unknown: Vec<String> =
            self.terms.keys().filter(|k| !known.contains(*k)).cloned().collect();
        if unknown.is_empty() { Ok(()) } else { Err(StoreError::InvalidFilter(unknown)) }
    }

    #[must_use]
    pub fn matches(&self, feature: &Feature) -> bool {
        self.terms.iter().all(|(key, expected)| {
            feature
                .properties
                .get(key)
                .is_some_and(|v| fold(&value_text(v)) == fold(expected))
        })
    }
}

impl SpotFilter {
    /// Builds a filter from request pairs, where a key may appear only once.
    ///
    /// # Errors
    /// [`StoreError::RepeatedFilter`] listing every repeated key in sorted order.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, StoreError> {
        let mut filter = Self::new();
        let mut repeated = BTreeSet::new();
        for (k, v) in pairs {
            let key = k.into();
            if filter.terms.contains_key(&key) {
                repeated.insert(key);
            } else {
                filter.terms.insert(key, v.into());
            }
        }
        if repeated.is_empty() {
            Ok(filter)
        } else {
            Err(StoreError::RepeatedFilter(repeated.into_iter().collect()))
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SpotFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (k, v) in iter {
            filter.insert(k, v);
        }
        filter
    }
}

/// Every property key that occurs on at least one feature. This is the
/// schema filters are validated against.
#[must_use]
pub fn known_property_keys(features: &[Feature]) -> BTreeSet<String> {
    features.iter().flat_map(|f| f.properties.keys().cloned()).collect()
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}
