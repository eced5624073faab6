use crate::feature::Feature;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldCounts {
    pub field: String,
    /// Most frequent first; ties broken by value.
    pub values: Vec<ValueCount>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub total: usize,
    pub fields: Vec<FieldCounts>,
}

impl FieldSummary {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldCounts> {
        self.fields.iter().find(|f| f.field == name)
    }
}

/// Count how often each value of each requested field occurs. Features
/// lacking a field, or holding `null`, are not counted for it.
#[must_use]
pub fn summarize(features: &[Feature], fields: &[&str]) -> FieldSummary {
    let fields = fields
        .iter()
        .map(|&field| {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for f in features {
                match f.properties.get(field) {
                    None | Some(Value::Null) => {}
                    Some(_) => {
                        if let Some(text) = f.property_text(field) {
                            *counts.entry(text).or_default() += 1;
                        }
                    }
                }
            }
            let mut values: Vec<ValueCount> =
                counts.into_iter().map(|(value, count)| ValueCount { value, count }).collect();
            values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            FieldCounts { field: field.to_string(), values }
        })
        .collect();
    FieldSummary { total: features.len(), fields }
}
