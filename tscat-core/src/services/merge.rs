//! Reconciles a translated catalog with a freshly extracted one.
//!
//! Messages are matched on (context, source, comment). Translations follow
//! their message into the new catalog; messages that disappeared upstream
//! are kept as `vanished` when somebody translated them and dropped
//! otherwise.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::catalog::{Catalog, Context, Message, MessageStatus};

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// Present on both sides.
    pub kept: usize,
    /// New upstream, left unfinished.
    pub added: usize,
    /// Previously vanished, present upstream again.
    pub revived: usize,
    pub vanished: usize,
    /// Gone upstream and never translated.
    pub dropped: usize,
}

type Key<'a> = (&'a str, &'a str, Option<&'a str>);

fn key<'a>(ctx: &'a str, m: &'a Message) -> Key<'a> {
    (ctx, m.source.as_str(), m.comment.as_deref())
}

pub fn merge(existing: &Catalog, extracted: &Catalog) -> (Catalog, MergeReport) {
    let mut report = MergeReport::default();

    let previous: HashMap<Key, &Message> = existing.messages().map(|(c, m)| (key(c, m), m)).collect();
    let mut used: HashSet<Key> = HashSet::new();

    let mut out = Catalog {
        language: if existing.language.is_empty() {
            extracted.language.clone()
        } else {
            existing.language.clone()
        },
        source_language: existing
            .source_language
            .clone()
            .or_else(|| extracted.source_language.clone()),
        version: existing.version.clone(),
        contexts: Vec::with_capacity(extracted.contexts.len()),
    };

    for ctx in &extracted.contexts {
        let mut merged = Context::new(ctx.name.clone());

        for m in &ctx.messages {
            let k = key(&ctx.name, m);
            let mut next = m.clone();

            match previous.get(&k) {
                Some(old) => {
                    used.insert(k);
                    next.translation = old.translation.clone();
                    next.translation_variants = old.translation_variants.clone();
                    next.numerus_forms = old.numerus_forms.clone();
                    next.translator_comment = old.translator_comment.clone();
                    if old.status.is_gone() {
                        next.status = MessageStatus::Unfinished;
                        report.revived += 1;
                    } else {
                        next.status = old.status;
                        report.kept += 1;
                    }
                }
                None => {
                    next.translation.clear();
                    next.translation_variants.clear();
                    next.numerus_forms.iter_mut().for_each(String::clear);
                    next.status = MessageStatus::Unfinished;
                    report.added += 1;
                }
            }

            merged.messages.push(next);
        }

        out.contexts.push(merged);
    }

    for ctx in &existing.contexts {
        for m in &ctx.messages {
            if used.contains(&key(&ctx.name, m)) {
                continue;
            }

            if m.is_untranslated() {
                report.dropped += 1;
                continue;
            }

            let mut gone = m.clone();
            if !gone.status.is_gone() {
                gone.status = MessageStatus::Vanished;
            }
            report.vanished += 1;

            match out.context_mut(&ctx.name) {
                Some(target) => target.messages.push(gone),
                None => {
                    let mut target = Context::new(ctx.name.clone());
                    target.messages.push(gone);
                    out.contexts.push(target);
                }
            }
        }
    }

    tracing::info!(
        kept = report.kept,
        added = report.added,
        revived = report.revived,
        vanished = report.vanished,
        dropped = report.dropped,
        "catalog merged"
    );

    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(contexts: Vec<(&str, Vec<Message>)>) -> Catalog {
        let mut c = Catalog::new("ko");
        for (name, messages) in contexts {
            let mut ctx = Context::new(name);
            ctx.messages = messages;
            c.contexts.push(ctx);
        }
        c
    }

    #[test]
    fn carries_translations_and_marks_removed_as_vanished() {
        let existing = catalog(vec![(
            "About",
            vec![
                Message::translated("Developed by", "개발: "),
                Message::translated("Support the development", "개발 지원"),
                Message::new("Buy the Karma edition"),
            ],
        )]);
        let extracted = catalog(vec![(
            "About",
            vec![Message::new("Developed by"), Message::new("QField Version: %1 (%2)")],
        )]);

        let (merged, report) = merge(&existing, &extracted);
        let about = merged.context("About").unwrap();

        assert_eq!(about.messages.len(), 3);
        assert_eq!(about.messages[0].translation, "개발: ");
        assert_eq!(about.messages[0].status, MessageStatus::Finished);
        assert_eq!(about.messages[1].source, "QField Version: %1 (%2)");
        assert_eq!(about.messages[1].status, MessageStatus::Unfinished);
        assert_eq!(about.messages[2].source, "Support the development");
        assert_eq!(about.messages[2].status, MessageStatus::Vanished);

        assert_eq!(
            report,
            MergeReport {
                kept: 1,
                added: 1,
                revived: 0,
                vanished: 1,
                dropped: 1,
            }
        );
    }

    #[test]
    fn vanished_message_is_revived_for_review() {
        let mut old = Message::translated("Altitude", "고도");
        old.status = MessageStatus::Vanished;
        let existing = catalog(vec![("Position", vec![old])]);
        let extracted = catalog(vec![("Position", vec![Message::new("Altitude")])]);

        let (merged, report) = merge(&existing, &extracted);
        let m = &merged.contexts[0].messages[0];
        assert_eq!(m.translation, "고도");
        assert_eq!(m.status, MessageStatus::Unfinished);
        assert_eq!(report.revived, 1);
    }

    #[test]
    fn removed_context_is_appended() {
        let existing = catalog(vec![("Legacy", vec![Message::translated("Map", "지도")])]);
        let extracted = catalog(vec![("About", vec![Message::new("Altitude")])]);

        let (merged, _) = merge(&existing, &extracted);
        let names: Vec<&str> = merged.contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["About", "Legacy"]);
        assert_eq!(merged.contexts[1].messages[0].status, MessageStatus::Vanished);
    }

    #[test]
    fn comment_disambiguates() {
        let mut old = Message::translated("Open", "열기");
        old.comment = Some("verb".into());
        let existing = catalog(vec![("Menu", vec![old])]);
        let mut new = Message::new("Open");
        new.comment = Some("adjective".into());
        let extracted = catalog(vec![("Menu", vec![new])]);

        let (merged, report) = merge(&existing, &extracted);
        assert_eq!(merged.contexts[0].messages[0].translation, "");
        assert_eq!(report.added, 1);
        assert_eq!(report.vanished, 1);
    }
}
