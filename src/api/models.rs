//! Request and response bodies of the parking spot API.

use super::errors::ApiError;
use crate::feature::Feature;
use crate::types::is_mutable_field;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const NO_MATCHES_MESSAGE: &str = "no parking spots match the given filters";

#[derive(Serialize, Deserialize, Debug)]
pub struct ListResponse {
    #[serde(rename = "type")]
    pub kind: String,
    /// Present only when nothing matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub features: Vec<Feature>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedResponse {
    pub message: String,
    pub id: String,
    pub updated_properties: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DeletedResponse {
    pub message: String,
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub ok: bool,
    pub features: usize,
}

#[derive(Deserialize, Debug, Default)]
pub struct StatsParams {
    /// Comma-separated property names.
    pub fields: Option<String>,
}

impl StatsParams {
    #[must_use]
    pub fn field_list(&self) -> Option<Vec<String>> {
        let list: Vec<String> = self
            .fields
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        (!list.is_empty()).then_some(list)
    }
}

/// Turn an update body into a string patch. Scalars are stringified;
/// non-scalar values are dropped unless they target an updatable field,
/// which is rejected.
///
/// # Errors
/// [`ApiError::BadRequest`] for a non-scalar value on an updatable field.
pub fn patch_from_body(body: &Map<String, Value>) -> Result<BTreeMap<String, String>, ApiError> {
    let mut patch = BTreeMap::new();
    for (key, value) in body {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                if is_mutable_field(key) {
                    return Err(ApiError::BadRequest(format!(
                        "property {key} must be a string, number or boolean"
                    )));
                }
                continue;
            }
        };
        patch.insert(key.clone(), text);
    }
    Ok(patch)
}
