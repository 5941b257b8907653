use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

// %1, %2 ... and the locale-aware %L1 form
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%L?([1-9][0-9]*)").expect("placeholder pattern"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)(?:\s[^<>]*?)?(/?)>").expect("markup pattern")
});

/// Positional placeholder numbers used in `text`, kept as digit strings so
/// no number is too large to compare.
pub fn placeholders(text: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|n| n.as_str().to_string())
        .collect()
}

/// Rich-text tags used in `text`, keyed as `b`, `/b`, `br/` and counted.
pub fn markup_tags(text: &str) -> BTreeMap<String, usize> {
    let mut tags = BTreeMap::new();
    for c in TAG_RE.captures_iter(text) {
        let closing = c.get(1).map_or("", |m| m.as_str());
        let name = c.get(2).map_or("", |m| m.as_str()).to_lowercase();
        let self_closing = c.get(3).map_or("", |m| m.as_str());
        *tags.entry(format!("{closing}{name}{self_closing}")).or_insert(0) += 1;
    }
    tags
}

/// Renders a placeholder set as `%1, %2` for messages.
pub fn describe(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        return "none".to_string();
    }
    let mut numbers: Vec<&String> = set.iter().collect();
    // no leading zeros, so shorter means smaller
    numbers.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    numbers
        .iter()
        .map(|n| format!("%{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}
