//! # wordcache
//!
//! A local, queryable SQLite cache of word-game vocabulary with scoring
//! metadata, populated by paginated calls to a remote word-search service.
//! Fetches survive mid-flight cancellation by persisting partial results,
//! and the store serves indexed by-length, top-N, search and statistics
//! queries without full rescans.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordcache::{CancelToken, Config, FetchOptions, Fetcher, HttpSearchClient, MergePipeline, WordStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = WordStore::open(&config.database.path)?;
//!
//!     let cancel = CancelToken::new();
//!     let fetcher = Fetcher::new(
//!         HttpSearchClient::new(&config.fetch)?,
//!         MergePipeline::new(store.clone()),
//!         cancel,
//!         FetchOptions::from_config(&config.fetch),
//!     );
//!
//!     // Pull every 4-letter word into the local cache
//!     let words = fetcher.fetch_length(4).await?;
//!     println!("Fetched {} words", words.len());
//!
//!     for record in store.get_top(Some(4), 10)? {
//!         println!("{} - {} points", record.word, record.points);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod fetch;
pub mod import;
pub mod merge;
pub mod storage;
pub mod utils;

// Re-export main API types
pub use config::Config;
pub use error::{Result, WordCacheError};
pub use fetch::{
    CancelToken, FetchOptions, Fetcher, HttpSearchClient, PartialWords, ProgressFn, WordSearchApi,
};
pub use import::LegacyImporter;
pub use merge::MergePipeline;
pub use storage::{
    DictRegistry, SearchFilter, SizeInfo, WordInput, WordRecord, WordStatistics, WordStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_imports() {
        // Ensure all major types can be imported
        let _config = Config::default();
    }
}
