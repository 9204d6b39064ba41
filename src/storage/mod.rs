//! Storage functionality for wordcache
//!
//! This module provides the durable, indexed word store backed by embedded
//! SQLite, plus the dictionary membership bitmask encoding.

pub mod database;
pub mod flags;
pub mod schema;

// Re-export main types
pub use database::{SearchFilter, WordStore};
pub use flags::DictRegistry;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One freshly fetched or imported word, before encoding.
///
/// Matches the remote envelope's per-word shape, so pages deserialize
/// straight into batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordInput {
    pub word: String,

    #[serde(default)]
    pub points: u32,

    /// Dictionary name -> membership, as reported by the source
    #[serde(default)]
    pub dict_matches: HashMap<String, bool>,
}

/// One stored word row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub length: u32,
    pub points: u32,
    pub dict_flags: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Aggregate statistics over the store, globally or for one length
#[derive(Debug, Clone, PartialEq)]
pub struct WordStatistics {
    pub total_words: u64,
    pub average_points: f64,
    pub highest_points: u32,
    pub lowest_points: u32,
    pub total_points: u64,
    pub highest_word: String,
}

/// Backing file size information, read fresh from the filesystem
#[derive(Debug, Clone)]
pub struct SizeInfo {
    pub size_bytes: u64,
    pub size_formatted: String,
    pub file_path: String,
}
