//! One-shot legacy JSON import
//!
//! Converts the legacy flat-file database (nested `word_pages[].word_list[]`
//! structure) into one word store batch. All-or-nothing per invocation: a
//! read or parse failure aborts before any write. The per-record length is
//! derived from each word, since the legacy format spans multiple lengths
//! without annotating them.

use crate::error::{Result, WordCacheError};
use crate::merge::MergePipeline;
use crate::storage::WordInput;
use chrono::Utc;
use serde::Deserialize;
use std::path::Path;

/// Legacy flat-file layout; everything but the word pages is ignored
#[derive(Debug, Deserialize)]
struct LegacyDatabase {
    #[serde(default)]
    word_pages: Vec<LegacyPage>,
}

#[derive(Debug, Deserialize)]
struct LegacyPage {
    #[serde(default)]
    word_list: Vec<WordInput>,
}

/// Imports the legacy JSON database into the word store
pub struct LegacyImporter {
    pipeline: MergePipeline,
}

impl LegacyImporter {
    pub fn new(pipeline: MergePipeline) -> Self {
        Self { pipeline }
    }

    /// Import all words from the legacy file as a single batch.
    ///
    /// Returns `Ok(true)` if any words were written, `Ok(false)` if the file
    /// contained none. Records migration metadata on success.
    pub fn import<P: AsRef<Path>>(&self, source: P) -> Result<bool> {
        let source = source.as_ref();
        log::info!("Migrating legacy database from {}", source.display());

        let content = std::fs::read_to_string(source).map_err(|e| {
            WordCacheError::Import(format!("Failed to read {}: {}", source.display(), e))
        })?;
        let legacy: LegacyDatabase = serde_json::from_str(&content).map_err(|e| {
            WordCacheError::Import(format!("Failed to parse {}: {}", source.display(), e))
        })?;

        let all_words: Vec<WordInput> = legacy
            .word_pages
            .into_iter()
            .flat_map(|page| page.word_list)
            .collect();

        if all_words.is_empty() {
            log::warn!("No words found in {}", source.display());
            return Ok(false);
        }

        log::info!("Found {} words to migrate", all_words.len());
        let written = self.pipeline.store().upsert_batch(&all_words)?;
        log::info!("Successfully migrated {} words", written);

        let store = self.pipeline.store();
        store.set_metadata("migrated_from", &source.display().to_string())?;
        store.set_metadata("migration_date", &Utc::now().to_rfc3339())?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::WordStore;
    use tempfile::tempdir;

    const LEGACY_JSON: &str = r#"{
        "request": {"length": 0, "dictionary": "all_en"},
        "word_pages": [
            {"word_list": [
                {"word": "cat", "points": 5, "dict_matches": {"wordle": true}},
                {"word": "bird", "points": 7}
            ]},
            {"word_list": [
                {"word": "ox", "points": 9}
            ]}
        ],
        "version": "2.0_sqlite"
    }"#;

    #[test]
    fn test_import_flattens_pages_and_derives_lengths() {
        let dir = tempdir().unwrap();
        let store = WordStore::open(dir.path().join("words.db")).unwrap();
        let legacy_file = dir.path().join("database.json");
        std::fs::write(&legacy_file, LEGACY_JSON).unwrap();

        let importer = LegacyImporter::new(MergePipeline::new(store.clone()));
        assert!(importer.import(&legacy_file).unwrap());

        let distribution = store.length_distribution().unwrap();
        let entries: Vec<(u32, u64)> = distribution.into_iter().collect();
        assert_eq!(entries, vec![(2, 1), (3, 1), (4, 1)]);

        assert!(store.metadata("migrated_from").unwrap().is_some());
        assert!(store.metadata("migration_date").unwrap().is_some());
    }

    #[test]
    fn test_unreadable_source_aborts_before_any_write() {
        let dir = tempdir().unwrap();
        let store = WordStore::open(dir.path().join("words.db")).unwrap();
        let importer = LegacyImporter::new(MergePipeline::new(store.clone()));

        assert!(importer.import(dir.path().join("missing.json")).is_err());
        assert!(store.length_distribution().unwrap().is_empty());
        assert_eq!(store.metadata("migrated_from").unwrap(), None);
    }

    #[test]
    fn test_malformed_json_aborts_before_any_write() {
        let dir = tempdir().unwrap();
        let store = WordStore::open(dir.path().join("words.db")).unwrap();
        let legacy_file = dir.path().join("database.json");
        std::fs::write(&legacy_file, "not json at all").unwrap();

        let importer = LegacyImporter::new(MergePipeline::new(store.clone()));
        assert!(importer.import(&legacy_file).is_err());
        assert!(store.length_distribution().unwrap().is_empty());
    }

    #[test]
    fn test_empty_legacy_file_imports_nothing() {
        let dir = tempdir().unwrap();
        let store = WordStore::open(dir.path().join("words.db")).unwrap();
        let legacy_file = dir.path().join("database.json");
        std::fs::write(&legacy_file, r#"{"word_pages": []}"#).unwrap();

        let importer = LegacyImporter::new(MergePipeline::new(store.clone()));
        assert!(!importer.import(&legacy_file).unwrap());
    }
}
