use super::key;
use super::model::TMEntry;
use crate::services::placeholder;

pub fn exact_match<'a>(
    entries: &'a [TMEntry],
    source_lang: &str,
    target_lang: &str,
    original: &str,
) -> Option<&'a TMEntry> {
    if original.trim().is_empty() {
        return None;
    }

    let norm = key::normalize(original);
    let h = key::hash_norm(&norm);
    let wanted = placeholder::placeholders(original);

    entries.iter().find(|e| {
        e.source_lang == source_lang
            && e.target_lang == target_lang
            && e.hash == h
            && e.normalized == norm
            && placeholder::placeholders(&e.translation) == wanted
    })
}
