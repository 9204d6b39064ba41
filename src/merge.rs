//! Merge pipeline: the single write entry point for freshly fetched words
//!
//! Takes a batch for one target length, upserts it into the word store and
//! logs before/after counts. `is_partial` records why the merge happened
//! (interrupted vs complete fetch); both cases use the identical upsert path.

use crate::error::Result;
use crate::storage::{WordInput, WordStore};

/// Upserts fetched batches into the word store with observability logging
#[derive(Clone)]
pub struct MergePipeline {
    store: WordStore,
}

impl MergePipeline {
    pub fn new(store: WordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &WordStore {
        &self.store
    }

    /// Merge a fetched batch for one length.
    ///
    /// Returns `Ok(false)` only for an empty batch; store errors propagate.
    pub fn merge(&self, new_words: &[WordInput], length: u32, is_partial: bool) -> Result<bool> {
        if new_words.is_empty() {
            log::info!("No new words to merge for length {}", length);
            return Ok(false);
        }

        log::info!(
            "Starting merge for {}-letter words: {} new words",
            length,
            new_words.len()
        );

        let existing = self.store.count_for_length(length)?;
        log::info!("Existing {}-letter words in store: {}", length, existing);

        let written = self.store.upsert_batch(new_words)?;
        log::info!("Batch upsert completed: {} words processed", written);

        let updated = self.store.count_for_length(length)?;
        log::info!("Total {}-letter words after merge: {}", length, updated);

        let result_type = if is_partial { "partial" } else { "complete" };
        log::info!(
            "Merge completed for {}-letter words ({} update)",
            length,
            result_type
        );

        if let Ok(size) = self.store.size_info() {
            log::info!("Store size: {}", size.size_formatted);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::WordStore;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn word(w: &str, points: u32) -> WordInput {
        WordInput {
            word: w.to_string(),
            points,
            dict_matches: HashMap::new(),
        }
    }

    #[test]
    fn test_merge_empty_batch_returns_false() {
        let dir = tempdir().unwrap();
        let store = WordStore::open(dir.path().join("words.db")).unwrap();
        let pipeline = MergePipeline::new(store);

        assert!(!pipeline.merge(&[], 4, false).unwrap());
    }

    #[test]
    fn test_partial_and_complete_share_the_upsert_path() {
        let dir = tempdir().unwrap();
        let store = WordStore::open(dir.path().join("words.db")).unwrap();
        let pipeline = MergePipeline::new(store.clone());

        assert!(pipeline.merge(&[word("abcd", 10)], 4, true).unwrap());
        assert!(pipeline.merge(&[word("efgh", 7)], 4, false).unwrap());

        let rows = store.get_by_length(4, None).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
