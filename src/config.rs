//! Configuration for wordcache
//!
//! Central configuration with sensible defaults matching the reference
//! deployment (WordFinder API, page size 50, all_en dictionary selector).

use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Word store settings
    pub database: DatabaseConfig,

    /// Remote fetch settings
    pub fetch: FetchConfig,
}

/// Word store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// Remote fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the word search endpoint
    pub base_url: String,

    /// Dictionary selector sent with every request
    pub dictionary: String,

    /// Number of words requested per page
    pub page_size: u32,

    /// Delay between successful page requests, in milliseconds
    pub page_delay_ms: u64,

    /// Delay between lengths in sequential multi-length fetches, in milliseconds
    pub length_delay_ms: u64,

    /// Bound on a single page request, in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "database/word_database.db".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fly.wordfinderapi.com/api/search".to_string(),
            dictionary: "all_en".to_string(),
            page_size: 50,
            page_delay_ms: 100,
            length_delay_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}
