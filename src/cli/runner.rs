use crate::store::{FeatureStore, SpotDraft, SpotFilter};
use crate::types::DEFAULT_SUMMARY_FIELDS;
use std::collections::BTreeMap;
use std::io::Write;

use super::command::Command;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

/// Run a command against `store`, printing human-readable output to stdout.
///
/// # Errors
/// Returns the store error of a failed operation.
pub fn run(store: &FeatureStore, cmd: Command) -> Result<(), Box<dyn std::error::Error>> {
    run_with_format(store, cmd, OutputMode::Human, &mut std::io::stdout().lock())
}

/// # Errors
/// Returns the store error of a failed operation, or a write error on `out`.
pub fn run_with_format(
    store: &FeatureStore,
    cmd: Command,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::List { filters } => {
            let filter = SpotFilter::from_pairs(filters)?;
            let features = store.list(&filter)?;
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "type": store.snapshot().type_name(),
                        "features": features,
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => {
                    for f in &features {
                        writeln!(out, "{}", f.id)?;
                    }
                }
                OutputMode::Human => {
                    if features.is_empty() {
                        writeln!(out, "no parking spots match")?;
                    }
                    for f in &features {
                        let name = f.property_text("name").unwrap_or_else(|| "-".into());
                        writeln!(out, "{} {} name={name}", f.id, f.geometry.kind())?;
                    }
                }
            }
            Ok(())
        }
        Command::Add { lon, lat, properties } => {
            let draft = properties
                .into_iter()
                .fold(SpotDraft::point(lon, lat), |d, (k, v)| d.with_property(k, v));
            let id = store.create(draft)?;
            log::info!(target: crate::logger::AUDIT_TARGET, "create id={id} (cli)");
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({"action": "created", "id": id}))?,
                OutputMode::Plain => writeln!(out, "{id}")?,
                OutputMode::Human => writeln!(out, "created id={id}")?,
            }
            Ok(())
        }
        Command::Update { id, set } => {
            let patch: BTreeMap<String, String> = set.into_iter().collect();
            let updated = store.update(&id, &patch)?;
            log::info!(target: crate::logger::AUDIT_TARGET, "update id={id} (cli)");
            match mode {
                OutputMode::Json => writeln!(
                    out,
                    "{}",
                    serde_json::json!({"action": "updated", "id": id, "updatedProperties": updated})
                )?,
                _ => {
                    for (k, v) in &updated {
                        writeln!(out, "{k}={v}")?;
                    }
                }
            }
            Ok(())
        }
        Command::Delete { id } => {
            let removed = store.delete(&id)?;
            log::info!(target: crate::logger::AUDIT_TARGET, "delete id={removed} (cli)");
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({"action": "deleted", "id": removed}))?,
                OutputMode::Plain => writeln!(out, "{removed}")?,
                OutputMode::Human => writeln!(out, "deleted id={removed}")?,
            }
            Ok(())
        }
        Command::Keys => {
            let keys: Vec<String> = store.known_keys().into_iter().collect();
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string(&keys)?)?,
                _ => {
                    for k in keys {
                        writeln!(out, "{k}")?;
                    }
                }
            }
            Ok(())
        }
        Command::Analyze { fields } => {
            let summary = if fields.is_empty() {
                store.field_summary(&DEFAULT_SUMMARY_FIELDS)
            } else {
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                store.field_summary(&fields)
            };
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?,
                OutputMode::Plain => {
                    for f in &summary.fields {
                        for v in &f.values {
                            writeln!(out, "{}\t{}\t{}", f.field, v.value, v.count)?;
                        }
                    }
                }
                OutputMode::Human => {
                    writeln!(out, "features: {}", summary.total)?;
                    for f in &summary.fields {
                        writeln!(out, "{}:", f.field)?;
                        if f.values.is_empty() {
                            writeln!(out, "   (no data)")?;
                        }
                        for v in &f.values {
                            writeln!(out, "   {}: {}", v.value, v.count)?;
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
