use std::path::Path;

use serde_json::{json, Value};

use crate::model::catalog::Catalog;
use crate::model::config::CoreConfig;
use crate::services::{ai, encoding, pipeline, qa, translation_memory};

mod catalog;
mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

pub(crate) fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

pub(crate) fn get_catalog(payload: &Value, key: &str) -> Result<Catalog, String> {
    let v = payload
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| format!("payload.{key} is required"))?;

    serde_json::from_value::<Catalog>(v.clone()).map_err(|e| format!("invalid payload.{key}: {e}"))
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// Handles one request line and returns the response line.
pub fn handle(input: &str, cfg: &CoreConfig) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);
    let cmd = Command::from(cmd_str);

    tracing::debug!(cmd = cmd_str, "request");

    if cmd.is_catalog() {
        return match catalog::handle(cmd, payload, cfg) {
            Some(Ok(v)) => ok(id, v),
            Some(Err(e)) => err(id, e),
            None => err(id, "unknown command"),
        };
    }

    match cmd {
        Command::Ping => ok(id, json!({ "message": "tscat-core alive" })),

        Command::RunQa => match get_catalog(payload, "catalog") {
            Ok(c) => ok(id, json!({ "issues": qa::run(&c) })),
            Err(e) => err(id, e),
        },

        Command::DetectEncoding => {
            let path_str = get_str(payload, "path");
            if path_str.is_empty() {
                return err(id, "payload.path is required");
            }
            match encoding::detect_from_file(Path::new(path_str)) {
                Ok(result) => ok(id, serde_json::to_value(result).unwrap_or(json!({}))),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::TmHarvest => {
            let catalog = match get_catalog(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let source_lang = source_lang_for(payload, &catalog, cfg);
            let tm_path = Path::new(&cfg.tm_path);

            let mut entries = translation_memory::store::load(tm_path);
            let added = translation_memory::harvest(&mut entries, &catalog, &source_lang);
            match translation_memory::store::save(tm_path, &entries) {
                Ok(()) => ok(id, json!({ "added": added })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::TranslateEntries | Command::TranslateWithTm => {
            let provider = get_str(payload, "provider");
            let api_key = get_str(payload, "api_key");
            let model = get_str(payload, "model");

            if provider.is_empty() { return err(id, "payload.provider is required"); }
            if api_key.is_empty() { return err(id, "payload.api_key is required"); }
            if model.is_empty() { return err(id, "payload.model is required"); }

            let mut catalog = match get_catalog(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };

            let source_lang = source_lang_for(payload, &catalog, cfg);
            let target_lang = match get_str(payload, "target_lang") {
                "" => catalog.language.clone(),
                t => t.to_string(),
            };

            let ai_cfg = ai::AiConfig {
                provider,
                api_key,
                model,
                source_lang: &source_lang,
                target_lang: &target_lang,
                temperature: cfg.ai_temperature,
                mark_finished: cfg.mark_filled_finished,
            };

            if cmd == Command::TranslateEntries {
                return match ai::translate_catalog(&mut catalog, &ai_cfg) {
                    Ok(report) => ok(id, json!({ "catalog": catalog, "report": report })),
                    Err(e) => err(id, e.to_string()),
                };
            }

            let pipe_cfg = pipeline::PipelineConfig {
                ai: ai_cfg,
                tm_path: Path::new(&cfg.tm_path),
                tm_only: false,
            };
            match pipeline::run(&mut catalog, pipe_cfg) {
                Ok(report) => ok(id, json!({ "catalog": catalog, "report": report })),
                Err(e) => err(id, e.to_string()),
            }
        }

        _ => err(id, "unknown command"),
    }
}

fn source_lang_for(payload: &Value, catalog: &Catalog, cfg: &CoreConfig) -> String {
    match get_str(payload, "source_lang") {
        "" => catalog
            .source_language
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| cfg.default_source_language.clone()),
        s => s.to_string(),
    }
}
