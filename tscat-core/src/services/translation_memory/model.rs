use serde::{Deserialize, Serialize};

use super::key;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TMEntry {
    pub source_lang: String,
    pub target_lang: String,

    pub original: String,
    pub translation: String,

    #[serde(default)]
    pub normalized: String,

    #[serde(default)]
    pub hash: String,
}

impl TMEntry {
    pub fn new(source_lang: &str, target_lang: &str, original: &str, translation: &str) -> Self {
        let normalized = key::normalize(original);
        let hash = key::hash_norm(&normalized);
        TMEntry {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            original: original.to_string(),
            translation: translation.to_string(),
            normalized,
            hash,
        }
    }
}
