use std::path::Path;

use crate::error::Result;
use crate::model::catalog::{Catalog, MessageStatus};
use crate::services::{
    ai,
    ai_types::AiRunReport,
    translation_memory::{matcher, model::TMEntry, store},
};

pub struct PipelineConfig<'a> {
    pub ai: ai::AiConfig<'a>,
    pub tm_path: &'a Path,
    /// Skip machine translation and only apply the memory.
    pub tm_only: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct PipelineReport {
    pub used_tm: usize,
    pub used_ai: usize,
    pub ai_report: Option<AiRunReport>,
}

/// Fills untranslated messages from the translation memory, then sends what
/// is left to machine translation. Accepted machine translations are added
/// to the memory.
pub fn run(catalog: &mut Catalog, cfg: PipelineConfig) -> Result<PipelineReport> {
    let mut tm_entries = store::load(cfg.tm_path);
    let source_lang = cfg.ai.source_lang;
    let target_lang = cfg.ai.target_lang;

    let mut used_tm = 0usize;
    let mut ai_needed: Vec<(usize, usize)> = Vec::new();

    for (ci, mi) in ai::pending(catalog) {
        let m = &mut catalog.contexts[ci].messages[mi];

        if let Some(tm) = matcher::exact_match(&tm_entries, source_lang, target_lang, &m.source) {
            m.set_translation(tm.translation.clone());
            if cfg.ai.mark_finished {
                m.status = MessageStatus::Finished;
            }
            used_tm += 1;
        } else {
            ai_needed.push((ci, mi));
        }
    }

    tracing::info!(used_tm, remaining = ai_needed.len(), "translation memory applied");

    let mut ai_report: Option<AiRunReport> = None;
    let mut used_ai = 0usize;

    if !ai_needed.is_empty() && !cfg.tm_only {
        let report = ai::translate_messages(catalog, &ai_needed, &cfg.ai)?;

        for &(ci, mi) in &ai_needed {
            let m = &catalog.contexts[ci].messages[mi];
            if m.numerus || m.translation.trim().is_empty() {
                continue;
            }
            used_ai += 1;
            tm_entries.push(TMEntry::new(source_lang, target_lang, &m.source, &m.translation));
        }

        ai_report = Some(report);
    }

    store::save(cfg.tm_path, &tm_entries)?;

    Ok(PipelineReport {
        used_tm,
        used_ai,
        ai_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::{Context, Message};

    #[test]
    fn fills_from_memory_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let tm_path = dir.path().join("tm.json");
        store::save(
            &tm_path,
            &[TMEntry::new("en", "ko", "Layer Name", "레이어 이름")],
        )
        .unwrap();

        let mut catalog = Catalog::new("ko");
        let mut ctx = Context::new("BadLayerItem");
        ctx.messages.push(Message::new("Layer Name"));
        ctx.messages.push(Message::new("Data Source"));
        catalog.contexts.push(ctx);

        let cfg = PipelineConfig {
            ai: ai::AiConfig {
                provider: "openai",
                api_key: "",
                model: "",
                source_lang: "en",
                target_lang: "ko",
                temperature: 0.3,
                mark_finished: false,
            },
            tm_path: &tm_path,
            tm_only: true,
        };

        let report = run(&mut catalog, cfg).unwrap();
        assert_eq!(report.used_tm, 1);
        assert_eq!(report.used_ai, 0);
        assert!(report.ai_report.is_none());

        let filled = &catalog.contexts[0].messages[0];
        assert_eq!(filled.translation, "레이어 이름");
        assert_eq!(filled.status, MessageStatus::Unfinished);
        assert!(catalog.contexts[0].messages[1].translation.is_empty());
    }
}
