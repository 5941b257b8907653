use sha2::{Digest, Sha256};

/// Lookup form of a source string: trimmed, inner whitespace collapsed.
///
/// Case, punctuation, placeholders and markup are significant in UI text
/// and stay untouched.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn hash_norm(norm: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(norm.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_only() {
        assert_eq!(normalize("  Layer\n  Name "), "Layer Name");
        assert_eq!(normalize("<b>%1</b> (%2)"), "<b>%1</b> (%2)");
        assert_ne!(normalize("Open"), normalize("open"));
    }

    #[test]
    fn hash_is_stable_hex() {
        let h = hash_norm("Altitude");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_norm("Altitude"));
        assert_ne!(h, hash_norm("altitude"));
    }
}
