use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::catalog::{Catalog, Message, MessageStatus};
use crate::services::placeholder;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub context: String,
    /// Source text of the offending message, empty for context-level issues.
    pub source: String,
    pub code: String,
    pub message: String,
}

impl QaIssue {
    fn new(context: &str, source: &str, code: &str, message: String) -> Self {
        QaIssue {
            context: context.to_string(),
            source: source.to_string(),
            code: code.to_string(),
            message,
        }
    }
}

pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let mut seen_contexts: HashSet<&str> = HashSet::new();

    for ctx in &catalog.contexts {
        if !seen_contexts.insert(ctx.name.as_str()) {
            issues.push(QaIssue::new(
                &ctx.name,
                "",
                "DUPLICATE_CONTEXT",
                format!("Context \"{}\" appears more than once", ctx.name),
            ));
        }

        let mut seen_messages: HashSet<(&str, Option<&str>)> = HashSet::new();

        for m in &ctx.messages {
            if !seen_messages.insert((m.source.as_str(), m.comment.as_deref())) {
                issues.push(QaIssue::new(
                    &ctx.name,
                    &m.source,
                    "DUPLICATE_MESSAGE",
                    "Same source and comment already present in this context".to_string(),
                ));
            }

            // Messages gone upstream are kept only for their translation
            if m.status.is_gone() {
                if m.is_untranslated() {
                    issues.push(QaIssue::new(
                        &ctx.name,
                        &m.source,
                        "EMPTY_TRANSLATION",
                        "Gone upstream and the translation is empty".to_string(),
                    ));
                }
                continue;
            }

            check_message(&ctx.name, m, &mut issues);
        }
    }

    issues
}

fn check_message(ctx: &str, m: &Message, issues: &mut Vec<QaIssue>) {
    let texts = m.translated_texts();

    match m.status {
        MessageStatus::Finished => {
            if m.is_untranslated() {
                issues.push(QaIssue::new(
                    ctx,
                    &m.source,
                    "FINISHED_BUT_EMPTY",
                    "Marked finished but the translation is empty".to_string(),
                ));
                return;
            }

            if m.numerus && texts.iter().any(|t| t.trim().is_empty()) {
                issues.push(QaIssue::new(
                    ctx,
                    &m.source,
                    "NUMERUS_FORM_EMPTY",
                    "At least one plural form is empty".to_string(),
                ));
            }

            let expected = placeholder::placeholders(&m.source);
            let expected_tags = placeholder::markup_tags(&m.source);

            for t in texts.iter().filter(|t| !t.is_empty()) {
                let found = placeholder::placeholders(t);
                if found != expected {
                    issues.push(QaIssue::new(
                        ctx,
                        &m.source,
                        "PLACEHOLDER_MISMATCH",
                        format!(
                            "Source uses {} but translation uses {}",
                            placeholder::describe(&expected),
                            placeholder::describe(&found)
                        ),
                    ));
                }

                if placeholder::markup_tags(t) != expected_tags {
                    issues.push(QaIssue::new(
                        ctx,
                        &m.source,
                        "MARKUP_MISMATCH",
                        "Rich-text tags differ between source and translation".to_string(),
                    ));
                }
            }

            let source_trim = m.source.trim();
            if texts.iter().any(|t| t.trim() == source_trim) && has_letters(source_trim) {
                issues.push(QaIssue::new(
                    ctx,
                    &m.source,
                    "SAME_AS_SOURCE",
                    "Translation is identical to the source text".to_string(),
                ));
            }
        }
        MessageStatus::Unfinished => {
            if !m.is_untranslated() {
                issues.push(QaIssue::new(
                    ctx,
                    &m.source,
                    "UNFINISHED_WITH_TRANSLATION",
                    "Translation present but still marked unfinished".to_string(),
                ));
            }
        }
        MessageStatus::Vanished | MessageStatus::Obsolete => {}
    }
}

// sources like "%1 (%2)" or "OK" may stay untranslated
fn has_letters(text: &str) -> bool {
    text.chars().filter(|c| c.is_alphabetic()).count() > 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::Context;

    fn catalog_with(messages: Vec<Message>) -> Catalog {
        let mut catalog = Catalog::new("ko");
        let mut ctx = Context::new("About");
        ctx.messages = messages;
        catalog.contexts.push(ctx);
        catalog
    }

    fn codes(issues: &[QaIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn clean_catalog_has_no_issues() {
        let catalog = catalog_with(vec![
            Message::translated("QField Settings folder: %1", "QField 설정 폴더: %1"),
            Message::new("QField Version: %1"),
            Message::translated("Add feature on <i>%1</i>", "<i>%1</i>에 피처 추가"),
        ]);
        assert!(run(&catalog).is_empty());
    }

    #[test]
    fn detects_placeholder_mismatch() {
        let catalog = catalog_with(vec![Message::translated(
            "Image %1 could not be copied to project folder %2.",
            "이미지 %1을(를) 복사할 수 없습니다.",
        )]);
        let issues = run(&catalog);
        assert_eq!(codes(&issues), vec!["PLACEHOLDER_MISMATCH"]);
        assert!(issues[0].message.contains("%1, %2"));
    }

    #[test]
    fn unfinished_messages_skip_placeholder_checks() {
        let mut m = Message::new("Could not create folder %1");
        m.translation = "폴더를 만들 수 없습니다".into();
        let issues = run(&catalog_with(vec![m]));
        assert_eq!(codes(&issues), vec!["UNFINISHED_WITH_TRANSLATION"]);
    }

    #[test]
    fn detects_markup_and_empty_finished() {
        let mut empty = Message::new("Altitude");
        empty.status = MessageStatus::Finished;
        let catalog = catalog_with(vec![
            Message::translated("Open <b>%1</b>", "%1 열기"),
            empty,
        ]);
        assert_eq!(codes(&run(&catalog)), vec!["MARKUP_MISMATCH", "FINISHED_BUT_EMPTY"]);
    }

    #[test]
    fn vanished_messages_are_ignored() {
        let mut m = Message::translated("Old text %1", "옛 문장");
        m.status = MessageStatus::Vanished;
        assert!(run(&catalog_with(vec![m])).is_empty());
    }

    #[test]
    fn vanished_without_translation_is_reported() {
        let mut vanished = Message::new("Old text");
        vanished.status = MessageStatus::Vanished;
        let mut obsolete = Message::new("Older text %1");
        obsolete.status = MessageStatus::Obsolete;
        let issues = run(&catalog_with(vec![vanished, obsolete]));
        assert_eq!(codes(&issues), vec!["EMPTY_TRANSLATION", "EMPTY_TRANSLATION"]);
        assert_eq!(issues[1].source, "Older text %1");
    }

    #[test]
    fn duplicates_are_reported() {
        let mut catalog = catalog_with(vec![Message::new("Altitude"), Message::new("Altitude")]);
        catalog.contexts.push(Context::new("About"));
        assert_eq!(codes(&run(&catalog)), vec!["DUPLICATE_MESSAGE", "DUPLICATE_CONTEXT"]);
    }

    #[test]
    fn same_as_source_needs_real_words() {
        let catalog = catalog_with(vec![
            Message::translated("Support the development", "Support the development"),
            Message::translated("%1 (%2)", "%1 (%2)"),
        ]);
        assert_eq!(codes(&run(&catalog)), vec!["SAME_AS_SOURCE"]);
    }
}
