use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AiItemResult {
    pub context: String,
    pub source: String,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AiRunReport {
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<AiItemResult>,
}
