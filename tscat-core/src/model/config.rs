use serde::{Deserialize, Serialize};

fn default_tm_path() -> String {
    "translation_memory.json".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_ai_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

/// What the parser does with a `type` attribute it does not know.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    Strict,
    #[default]
    Lenient,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    #[serde(default)]
    pub status_policy: StatusPolicy,

    /// Skip defective messages (and merge duplicate contexts) instead of
    /// failing the whole catalog.
    #[serde(default = "default_true")]
    pub recover_messages: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            status_policy: StatusPolicy::default(),
            recover_messages: true,
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        ParseOptions {
            status_policy: StatusPolicy::Strict,
            recover_messages: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CoreConfig {
    #[serde(default)]
    pub status_policy: StatusPolicy,

    #[serde(default = "default_true")]
    pub recover_messages: bool,

    #[serde(default = "default_tm_path")]
    pub tm_path: String,

    /// Used for TM keys when a catalog has no `sourcelanguage`.
    #[serde(default = "default_source_language", alias = "source_lang")]
    pub default_source_language: String,

    /// TM and machine-filled messages are normally left unfinished for review.
    #[serde(default)]
    pub mark_filled_finished: bool,

    #[serde(default = "default_ai_temperature")]
    pub ai_temperature: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            status_policy: StatusPolicy::default(),
            recover_messages: true,
            tm_path: default_tm_path(),
            default_source_language: default_source_language(),
            mark_filled_finished: false,
            ai_temperature: default_ai_temperature(),
        }
    }
}

impl CoreConfig {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            status_policy: self.status_policy,
            recover_messages: self.recover_messages,
        }
    }
}
