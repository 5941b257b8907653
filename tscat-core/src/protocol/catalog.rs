use std::path::Path;

use serde_json::{json, Value};

use super::command::Command;
use super::{get_catalog, get_str};
use crate::model::config::CoreConfig;
use crate::parsers::ts;
use crate::services::{catalog_file, merge, rebuild, stats};

/// Handles the `catalog.*` commands; `None` when `cmd` is not one of them.
pub fn handle(cmd: Command, payload: &Value, cfg: &CoreConfig) -> Option<Result<Value, String>> {
    let result = match cmd {
        Command::CatalogParse => parse(payload, cfg),
        Command::CatalogSerialize => {
            get_catalog(payload, "catalog").map(|c| json!({ "text": rebuild::rebuild(&c) }))
        }
        Command::CatalogLoad => load(payload, cfg),
        Command::CatalogSave => save(payload),
        Command::CatalogStats => {
            get_catalog(payload, "catalog").map(|c| json!({ "stats": stats::compute(&c) }))
        }
        Command::CatalogMerge => merge_catalogs(payload),
        _ => return None,
    };
    Some(result)
}

fn parse(payload: &Value, cfg: &CoreConfig) -> Result<Value, String> {
    let text = payload
        .get("text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "payload.text is required".to_string())?;

    let parsed = ts::parse(text, &cfg.parse_options()).map_err(|e| e.to_string())?;
    Ok(json!({ "catalog": parsed.catalog, "warnings": parsed.warnings }))
}

fn load(payload: &Value, cfg: &CoreConfig) -> Result<Value, String> {
    let path = get_str(payload, "path");
    if path.is_empty() {
        return Err("payload.path is required".into());
    }

    let parsed =
        catalog_file::load(Path::new(path), &cfg.parse_options()).map_err(|e| e.to_string())?;
    Ok(json!({ "catalog": parsed.catalog, "warnings": parsed.warnings }))
}

fn save(payload: &Value) -> Result<Value, String> {
    let path = get_str(payload, "path");
    if path.is_empty() {
        return Err("payload.path is required".into());
    }
    let catalog = get_catalog(payload, "catalog")?;

    catalog_file::save(Path::new(path), &catalog).map_err(|e| e.to_string())?;
    Ok(json!({ "path": path }))
}

fn merge_catalogs(payload: &Value) -> Result<Value, String> {
    let existing = get_catalog(payload, "existing")?;
    let extracted = get_catalog(payload, "extracted")?;

    let (catalog, report) = merge::merge(&existing, &extracted);
    Ok(json!({ "catalog": catalog, "report": report }))
}
