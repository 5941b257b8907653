use crate::error::{CoreError, Result};
use crate::model::catalog::{Catalog, Message, MessageStatus};
use crate::services::ai_types::{AiItemResult, AiRunReport};
use crate::services::placeholder;

use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::json;

use std::{thread, time::Duration};

pub struct AiConfig<'a> {
    pub provider: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub source_lang: &'a str,
    pub target_lang: &'a str,
    pub temperature: f32,
    /// Mark accepted translations finished instead of leaving them for review.
    pub mark_finished: bool,
}

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const TIMEOUT_SECS: u64 = 60;

const SYSTEM_PROMPT: &str = "You are a professional software localizer. \
Reply with the translated text only. Keep placeholders such as %1 or %L2 \
and rich-text tags such as <b> or <i> exactly as they appear.";

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * 2_u64.pow(attempt as u32) + jitter;
    Duration::from_millis(ms)
}

fn endpoint_for(provider: &str) -> Result<&'static str> {
    match provider {
        "openai" => Ok("https://api.openai.com/v1/chat/completions"),
        "deepseek" => Ok("https://api.deepseek.com/v1/chat/completions"),
        other => Err(CoreError::Ai(format!("unsupported provider \"{other}\""))),
    }
}

/// Positions `(context index, message index)` of live, untranslated messages.
pub fn pending(catalog: &Catalog) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (ci, ctx) in catalog.contexts.iter().enumerate() {
        for (mi, m) in ctx.messages.iter().enumerate() {
            if !m.status.is_gone() && m.is_untranslated() && !m.source.trim().is_empty() {
                out.push((ci, mi));
            }
        }
    }
    out
}

pub fn translate_catalog(catalog: &mut Catalog, cfg: &AiConfig) -> Result<AiRunReport> {
    let targets = pending(catalog);
    translate_messages(catalog, &targets, cfg)
}

pub fn translate_messages(
    catalog: &mut Catalog,
    targets: &[(usize, usize)],
    cfg: &AiConfig,
) -> Result<AiRunReport> {
    let endpoint = endpoint_for(cfg.provider)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .map_err(|e| CoreError::Ai(e.to_string()))?;

    let mut report = AiRunReport::default();

    for &(ci, mi) in targets {
        let Some(ctx) = catalog.contexts.get_mut(ci) else {
            continue;
        };
        let context_name = ctx.name.clone();
        let Some(m) = ctx.messages.get_mut(mi) else {
            continue;
        };

        let prompt = build_prompt(&context_name, m, cfg);
        let outcome = request_translation(&client, endpoint, cfg, &prompt)
            .and_then(|reply| accept_reply(&m.source, &reply));

        match outcome {
            Ok(text) => {
                m.set_translation(text);
                if cfg.mark_finished {
                    m.status = MessageStatus::Finished;
                }
                report.succeeded += 1;
                report.items.push(AiItemResult {
                    context: context_name,
                    source: m.source.clone(),
                    ok: true,
                    error: None,
                });
            }
            Err(err) => {
                tracing::warn!(context = %context_name, source = %m.source, "machine translation failed: {err}");
                report.failed += 1;
                report.items.push(AiItemResult {
                    context: context_name,
                    source: m.source.clone(),
                    ok: false,
                    error: Some(err),
                });
            }
        }
    }

    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "machine translation finished"
    );

    Ok(report)
}

fn request_translation(
    client: &Client,
    endpoint: &str,
    cfg: &AiConfig,
    prompt: &str,
) -> std::result::Result<String, String> {
    let body = json!({
        "model": cfg.model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": prompt }
        ],
        "temperature": cfg.temperature
    });

    let mut last_err = String::from("no attempt made");

    for attempt in 0..MAX_RETRIES {
        let retry = attempt + 1 < MAX_RETRIES;

        let resp = match client
            .post(endpoint)
            .bearer_auth(cfg.api_key)
            .json(&body)
            .send()
        {
            Ok(resp) => resp,
            Err(err) => {
                last_err = err.to_string();
                if retry {
                    thread::sleep(backoff(attempt));
                }
                continue;
            }
        };

        let status = resp.status();

        // Read as text first so HTTP error bodies are not lost
        let text = match resp.text() {
            Ok(t) => t,
            Err(err) => {
                last_err = err.to_string();
                if retry {
                    thread::sleep(backoff(attempt));
                }
                continue;
            }
        };

        if !status.is_success() {
            last_err = extract_error_message(status, &text);
            if should_retry_http(status) && retry {
                thread::sleep(backoff(attempt));
                continue;
            }
            break;
        }

        match extract_content(&text) {
            Ok(content) => return Ok(content),
            Err(err) => {
                last_err = err;
                if retry {
                    thread::sleep(backoff(attempt));
                }
            }
        }
    }

    Err(last_err)
}

fn extract_content(body: &str) -> std::result::Result<String, String> {
    let v: serde_json::Value =
        serde_json::from_str(body).map_err(|_| "Invalid JSON from AI".to_string())?;

    v.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| "Invalid AI response: missing choices[0].message.content".to_string())
}

/// Rejects replies that are empty or changed the placeholder set.
fn accept_reply(source: &str, reply: &str) -> std::result::Result<String, String> {
    let core = reply.trim();
    if core.is_empty() {
        return Err("empty translation".into());
    }

    let expected = placeholder::placeholders(source);
    let found = placeholder::placeholders(core);
    if expected != found {
        return Err(format!(
            "placeholders changed: expected {}, got {}",
            placeholder::describe(&expected),
            placeholder::describe(&found)
        ));
    }

    // replies come back trimmed; keep the source's surrounding whitespace
    if source.trim().is_empty() {
        return Ok(core.to_string());
    }
    let lead = &source[..source.len() - source.trim_start().len()];
    let trail = &source[source.trim_end().len()..];
    Ok(format!("{lead}{core}{trail}"))
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are usually transient
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = if trimmed.chars().count() > 400 {
        format!("{}...", trimmed.chars().take(400).collect::<String>())
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

fn build_prompt(context: &str, m: &Message, cfg: &AiConfig) -> String {
    let mut p = String::new();

    p.push_str(&format!(
        "Translate this user interface text from {} to {}.\n",
        cfg.source_lang, cfg.target_lang
    ));
    p.push_str(&format!("UI context: {context}\n"));

    if let Some(comment) = m.comment.as_deref().filter(|c| !c.trim().is_empty()) {
        p.push_str(&format!("Disambiguation: {}\n", comment.trim()));
    }
    if let Some(note) = m.extra_comment.as_deref().filter(|c| !c.trim().is_empty()) {
        p.push_str(&format!("Developer note: {}\n", note.trim()));
    }
    if m.numerus {
        p.push_str("The text is a plural form; keep %n as the count.\n");
    }

    p.push_str("Text:\n");
    p.push_str(&m.source);

    p
}
