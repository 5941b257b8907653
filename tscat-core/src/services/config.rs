use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::CoreConfig;

pub const CONFIG_ENV: &str = "TSCAT_CONFIG";
const CONFIG_FILE: &str = "tscat.json";

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Loads the configuration from `$TSCAT_CONFIG` or `./tscat.json`.
pub fn load() -> CoreConfig {
    load_from(&config_path())
}

/// Missing or broken files fall back to defaults.
pub fn load_from(path: &Path) -> CoreConfig {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return CoreConfig::default();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read config: {e}");
            return CoreConfig::default();
        }
    };

    match serde_json::from_str::<CoreConfig>(&data) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "config loaded");
            cfg
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "invalid config, using defaults: {e}");
            CoreConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::StatusPolicy;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tscat.json");
        fs::write(&path, r#"{"status_policy":"strict","tm_path":"tm/ko.json"}"#).unwrap();

        let cfg = load_from(&path);
        assert_eq!(cfg.status_policy, StatusPolicy::Strict);
        assert_eq!(cfg.tm_path, "tm/ko.json");
        assert!(cfg.recover_messages);
        assert_eq!(cfg.default_source_language, "en");
    }

    #[test]
    fn broken_or_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tscat.json");
        assert_eq!(load_from(&path), CoreConfig::default());

        fs::write(&path, "{ nope").unwrap();
        assert_eq!(load_from(&path), CoreConfig::default());
    }
}
