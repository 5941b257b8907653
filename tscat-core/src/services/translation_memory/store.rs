use super::key;
use super::model::TMEntry;
use crate::error::{CoreError, Result};
use crate::services::atomic;
use std::{collections::HashMap, fs, path::Path};

/// Reads the memory at `path`. A missing or unreadable file yields an empty
/// memory; entries from older files get their normalized form and hash
/// filled in and are written back.
pub fn load(path: &Path) -> Vec<TMEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read translation memory: {e}");
            return Vec::new();
        }
    };

    let mut entries: Vec<TMEntry> = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to parse translation memory: {e}");
            return Vec::new();
        }
    };

    let mut migrated = false;

    for e in entries.iter_mut() {
        migrated |= ensure_norm_hash(e);
    }

    let (mut final_entries, removed) = dedup(entries);
    if removed > 0 {
        migrated = true;
    }
    sort_entries(&mut final_entries);

    if migrated {
        if let Err(e) = save(path, &final_entries) {
            tracing::warn!(path = %path.display(), "failed to persist migration: {e}");
        }
    }

    tracing::debug!(path = %path.display(), entries = final_entries.len(), "translation memory loaded");
    final_entries
}

pub fn save(path: &Path, entries: &[TMEntry]) -> Result<()> {
    let (mut v, _removed) = dedup(entries.to_vec());
    sort_entries(&mut v);

    let json = serde_json::to_string_pretty(&v)
        .map_err(|e| CoreError::Memory(format!("failed to serialize: {e}")))?;

    atomic::write_atomic(path, json.as_bytes())
}

fn ensure_norm_hash(e: &mut TMEntry) -> bool {
    let mut changed = false;

    if e.normalized.is_empty() {
        e.normalized = key::normalize(&e.original);
        changed = true;
    }

    if e.hash.is_empty() {
        e.hash = key::hash_norm(&e.normalized);
        changed = true;
    }

    changed
}

fn dedup(entries: Vec<TMEntry>) -> (Vec<TMEntry>, usize) {
    let mut map: HashMap<(String, String, String), TMEntry> = HashMap::new();
    let mut removed = 0usize;

    for mut e in entries {
        ensure_norm_hash(&mut e);

        let key = (e.source_lang.clone(), e.target_lang.clone(), e.hash.clone());

        match map.get_mut(&key) {
            None => {
                map.insert(key, e);
            }
            Some(existing) => {
                if pick_better(existing, &e) {
                    *existing = e;
                }
                removed += 1;
            }
        }
    }

    (map.into_values().collect(), removed)
}

// Non-empty beats empty; otherwise the later entry wins.
fn pick_better(current: &TMEntry, candidate: &TMEntry) -> bool {
    let cur_empty = current.translation.trim().is_empty();
    let cand_empty = candidate.translation.trim().is_empty();

    if cur_empty != cand_empty {
        return cur_empty;
    }

    true
}

fn sort_entries(entries: &mut [TMEntry]) {
    entries.sort_by(|a, b| {
        (
            a.source_lang.as_str(),
            a.target_lang.as_str(),
            a.hash.as_str(),
            a.original.as_str(),
        )
            .cmp(&(
                b.source_lang.as_str(),
                b.target_lang.as_str(),
                b.hash.as_str(),
                b.original.as_str(),
            ))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_dedups_and_load_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tm.json");

        let entries = vec![
            TMEntry::new("en", "ko", "Altitude", "고도"),
            TMEntry::new("en", "ko", "Altitude ", "해발 고도"),
            TMEntry::new("en", "ko", "Layer Name", ""),
        ];
        save(&path, &entries).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.len(), 2);
        let altitude = loaded.iter().find(|e| e.normalized == "Altitude").unwrap();
        assert_eq!(altitude.translation, "해발 고도");
    }

    #[test]
    fn empty_translation_never_replaces_a_real_one() {
        let current = TMEntry::new("en", "ko", "Altitude", "고도");
        let candidate = TMEntry::new("en", "ko", "Altitude", " ");
        assert!(!pick_better(&current, &candidate));
        assert!(pick_better(&candidate, &current));
    }

    #[test]
    fn migrates_entries_without_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tm.json");
        fs::write(
            &path,
            r#"[{"source_lang":"en","target_lang":"ko","original":"Data Source","translation":"데이터 원본"}]"#,
        )
        .unwrap();

        let loaded = load(&path);
        assert_eq!(loaded[0].hash, key::hash_norm("Data Source"));
        assert!(fs::read_to_string(&path).unwrap().contains("\"hash\""));
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tm.json");
        fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_empty());
    }
}
