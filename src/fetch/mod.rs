//! Remote fetch functionality for wordcache
//!
//! Paginated retrieval from the word search endpoint with cooperative
//! cancellation and partial-result persistence.

pub mod cancel;
pub mod client;
pub mod orchestrator;

// Re-export main types
pub use cancel::CancelToken;
pub use client::{HttpSearchClient, SearchRequest, SearchResponse, WordPage, WordSearchApi};
pub use orchestrator::{FetchOptions, Fetcher, PartialWords, ProgressFn};
