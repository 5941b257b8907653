//! Exact-match translation memory persisted as a JSON file.

pub mod key;
pub mod matcher;
pub mod model;
pub mod store;

use crate::model::catalog::{Catalog, MessageStatus};
use model::TMEntry;

/// Adds every finished, non-numerus translation of `catalog` to `entries`.
/// Returns how many entries were appended (duplicates collapse on save).
pub fn harvest(entries: &mut Vec<TMEntry>, catalog: &Catalog, source_lang: &str) -> usize {
    let before = entries.len();

    for (_, m) in catalog.messages() {
        if m.status != MessageStatus::Finished || m.numerus || m.translation.trim().is_empty() {
            continue;
        }
        entries.push(TMEntry::new(
            source_lang,
            &catalog.language,
            &m.source,
            &m.translation,
        ));
    }

    entries.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::{Context, Message};

    #[test]
    fn harvests_finished_messages_only() {
        let mut catalog = Catalog::new("ko");
        let mut ctx = Context::new("About");
        ctx.messages.push(Message::translated("Support the development", "개발 지원"));
        ctx.messages.push(Message::new("Buy the Karma edition"));
        let mut gone = Message::translated("Old", "옛");
        gone.status = MessageStatus::Vanished;
        ctx.messages.push(gone);
        catalog.contexts.push(ctx);

        let mut entries = Vec::new();
        assert_eq!(harvest(&mut entries, &catalog, "en"), 1);
        assert_eq!(entries[0].target_lang, "ko");
        assert_eq!(entries[0].translation, "개발 지원");
    }
}
