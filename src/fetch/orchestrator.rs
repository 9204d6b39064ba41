//! Paginated fetch orchestrator
//!
//! Drives the remote search endpoint page by page for one or more word
//! lengths, feeding collected batches to the merge pipeline. Cancellation is
//! cooperative: the token is polled before the first page and before each
//! subsequent page, and a stop at a check point merges whatever has been
//! collected as a partial update instead of discarding it. A single failing
//! page is logged and skipped; only a failure on the very first request
//! aborts a length's fetch.

use crate::error::{Result, WordCacheError};
use crate::fetch::cancel::CancelToken;
use crate::fetch::client::{SearchRequest, WordSearchApi};
use crate::merge::MergePipeline;
use crate::storage::WordInput;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Progress callback invoked at page granularity with
/// `(pages_done, pages_total, message)`
pub type ProgressFn = dyn Fn(u32, u32, &str) + Send + Sync;

/// Tunables for one fetch run
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Words requested per page
    pub page_size: u32,

    /// Dictionary selector sent with every request
    pub dictionary: String,

    /// Delay between successful page requests
    pub page_delay: Duration,

    /// Delay between lengths in sequential multi-length fetches
    pub length_delay: Duration,

    /// Optional cap on words collected per length; reaching it stops the
    /// fetch early and merges as partial
    pub max_words: Option<usize>,
}

impl FetchOptions {
    pub fn from_config(config: &crate::config::FetchConfig) -> Self {
        Self {
            page_size: config.page_size,
            dictionary: config.dictionary.clone(),
            page_delay: Duration::from_millis(config.page_delay_ms),
            length_delay: Duration::from_millis(config.length_delay_ms),
            max_words: None,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&crate::config::FetchConfig::default())
    }
}

type SharedWords = Arc<Mutex<Vec<WordInput>>>;

/// Clonable view of a fetcher's in-flight buffer, handed to shutdown
/// handlers so they can report progress without holding the fetcher itself
#[derive(Clone)]
pub struct PartialWords {
    buffer: Arc<Mutex<SharedWords>>,
}

impl PartialWords {
    /// Copy of the words collected so far by the current fetch
    pub fn snapshot(&self) -> Vec<WordInput> {
        self.buffer
            .lock()
            .ok()
            .and_then(|buffer| buffer.lock().ok().map(|words| words.clone()))
            .unwrap_or_default()
    }
}

/// Fetches words for one or more lengths and merges them into the store
pub struct Fetcher<A: WordSearchApi> {
    api: A,
    pipeline: MergePipeline,
    cancel: CancelToken,
    options: FetchOptions,
    /// In-flight buffer of the most recently started fetch, exposed so a
    /// shutdown handler can snapshot progress between merge points
    partial: Arc<Mutex<SharedWords>>,
}

impl<A: WordSearchApi> Fetcher<A> {
    pub fn new(api: A, pipeline: MergePipeline, cancel: CancelToken, options: FetchOptions) -> Self {
        Self {
            api,
            pipeline,
            cancel,
            options,
            partial: Arc::new(Mutex::new(Arc::new(Mutex::new(Vec::new())))),
        }
    }

    /// Snapshot of the words collected so far by the current fetch
    pub fn partial_words(&self) -> Vec<WordInput> {
        self.partial_handle().snapshot()
    }

    /// Detached handle over the in-flight buffer
    pub fn partial_handle(&self) -> PartialWords {
        PartialWords {
            buffer: self.partial.clone(),
        }
    }

    /// Fetch all pages for one length and merge the result
    pub async fn fetch_length(&self, length: u32) -> Result<Vec<WordInput>> {
        self.fetch_length_with_progress(length, None).await
    }

    /// Fetch all pages for one length, reporting page-level progress
    pub async fn fetch_length_with_progress(
        &self,
        length: u32,
        progress: Option<&ProgressFn>,
    ) -> Result<Vec<WordInput>> {
        let buffer: SharedWords = Arc::new(Mutex::new(Vec::new()));
        if let Ok(mut slot) = self.partial.lock() {
            *slot = buffer.clone();
        }

        let request =
            SearchRequest::first_page(length, self.options.page_size, &self.options.dictionary);
        let mut all_words: Vec<WordInput> = Vec::new();

        if let Some(callback) = progress {
            callback(0, 1, &format!("[Length {}] Getting pagination info...", length));
        }

        // Check point: before any first page
        if self.cancel.is_cancelled() {
            log::info!("Cancellation requested before first request for length {}", length);
            return Ok(all_words);
        }

        log::info!("Making initial request for length {}", length);
        let response = self.api.search(request.clone()).await.map_err(|e| {
            WordCacheError::Fetch(format!("Initial request failed for length {}: {}", length, e))
        })?;

        let Some(first_page) = response.word_pages.first() else {
            log::info!("No word pages found in response for length {}", length);
            return Ok(all_words);
        };

        let total_pages = first_page.num_pages;
        let total_words = first_page.num_words;
        log::info!(
            "Length {}: found {} total words across {} pages",
            length,
            total_words,
            total_pages
        );

        let mut page_words = first_page.word_list.clone();
        self.truncate_to_cap(all_words.len(), &mut page_words);
        log::info!(
            "Length {}: page 1/{}: added {} words",
            length,
            total_pages,
            page_words.len()
        );
        all_words.extend(page_words);
        mirror(&buffer, &all_words);

        if let Some(callback) = progress {
            callback(
                1,
                total_pages,
                &format!("[Length {}] Page 1/{} - {} words", length, total_pages, all_words.len()),
            );
        }

        if self.cap_reached(all_words.len()) {
            log::info!(
                "Length {}: word cap reached after page 1 ({} words)",
                length,
                all_words.len()
            );
            self.pipeline.merge(&all_words, length, true)?;
            return Ok(all_words);
        }

        // Check point: before each subsequent page
        if self.cancel.is_cancelled() {
            log::info!("Length {}: graceful stop after page 1/{}", length, total_pages);
            self.pipeline.merge(&all_words, length, true)?;
            return Ok(all_words);
        }

        let last_page = self.last_page_for_cap(total_pages);
        for page_num in 2..=last_page {
            if self.cancel.is_cancelled() {
                log::info!(
                    "Length {}: graceful stop at page {}/{}",
                    length,
                    page_num - 1,
                    total_pages
                );
                self.pipeline.merge(&all_words, length, true)?;
                return Ok(all_words);
            }

            if let Some(callback) = progress {
                callback(
                    page_num - 1,
                    total_pages,
                    &format!("[Length {}] Fetching page {}/{}...", length, page_num, total_pages),
                );
            }

            log::info!("Length {}: fetching page {}/{}", length, page_num, total_pages);
            // One-based display page, zero-based wire token
            match self.api.search(request.with_page_token(page_num - 1)).await {
                Ok(response) => {
                    let mut page_words = response.page_words().to_vec();
                    if page_words.is_empty() {
                        log::info!(
                            "Length {}: page {}/{}: no words found",
                            length,
                            page_num,
                            total_pages
                        );
                    } else {
                        self.truncate_to_cap(all_words.len(), &mut page_words);
                        log::info!(
                            "Length {}: page {}/{}: added {} words",
                            length,
                            page_num,
                            total_pages,
                            page_words.len()
                        );
                        all_words.extend(page_words);
                        mirror(&buffer, &all_words);
                    }

                    if let Some(callback) = progress {
                        callback(
                            page_num,
                            total_pages,
                            &format!(
                                "[Length {}] Page {}/{} - total {} words",
                                length,
                                page_num,
                                total_pages,
                                all_words.len()
                            ),
                        );
                    }

                    if self.cap_reached(all_words.len()) {
                        log::info!(
                            "Length {}: word cap reached at page {} ({} words)",
                            length,
                            page_num,
                            all_words.len()
                        );
                        self.pipeline.merge(&all_words, length, true)?;
                        return Ok(all_words);
                    }

                    if !self.cancel.is_cancelled() {
                        tokio::time::sleep(self.options.page_delay).await;
                    }
                }
                Err(e) => {
                    // A single bad page must not abort the whole fetch
                    log::warn!(
                        "Length {}: error fetching page {}/{}: {}",
                        length,
                        page_num,
                        total_pages,
                        e
                    );
                    if self.cancel.is_cancelled() {
                        self.pipeline.merge(&all_words, length, true)?;
                        return Ok(all_words);
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            log::info!(
                "Length {}: graceful stop completed with {} words",
                length,
                all_words.len()
            );
            self.pipeline.merge(&all_words, length, true)?;
        } else {
            log::info!("Length {}: completed with {} words", length, all_words.len());
            self.pipeline.merge(&all_words, length, false)?;
            if let Some(callback) = progress {
                callback(
                    total_pages,
                    total_pages,
                    &format!("[Length {}] Completed - {} words", length, all_words.len()),
                );
            }
        }

        Ok(all_words)
    }

    /// Fetch several lengths one at a time, bounding peak request rate.
    ///
    /// A fatal error on one length is recorded as an empty result for that
    /// length; the remaining lengths still run.
    pub async fn fetch_lengths_sequential(
        &self,
        lengths: &[u32],
        progress: Option<&ProgressFn>,
    ) -> HashMap<u32, Vec<WordInput>> {
        log::info!("Starting sequential fetch for lengths {:?}", lengths);
        let mut results = HashMap::new();

        for (i, &length) in lengths.iter().enumerate() {
            log::info!("Fetching length {} ({}/{})", length, i + 1, lengths.len());
            match self.fetch_length_with_progress(length, progress).await {
                Ok(words) => {
                    log::info!("Completed fetch of {} words for length {}", words.len(), length);
                    results.insert(length, words);
                }
                Err(e) => {
                    log::error!("Error fetching words for length {}: {}", length, e);
                    results.insert(length, Vec::new());
                }
            }

            if i + 1 < lengths.len() && !self.cancel.is_cancelled() {
                tokio::time::sleep(self.options.length_delay).await;
            }
        }

        let total: usize = results.values().map(|words| words.len()).sum();
        log::info!(
            "Sequential fetch completed: {} total words across {} lengths",
            total,
            lengths.len()
        );
        results
    }

    /// Fetch several lengths concurrently; higher burst load, lower wall
    /// clock. Same per-length error isolation as the sequential policy.
    pub async fn fetch_lengths_concurrent(
        &self,
        lengths: &[u32],
    ) -> HashMap<u32, Vec<WordInput>> {
        log::info!("Starting concurrent fetch for lengths {:?}", lengths);

        let tasks = lengths
            .iter()
            .map(|&length| async move { (length, self.fetch_length(length).await) });
        let outcomes = futures::future::join_all(tasks).await;

        let mut results = HashMap::new();
        for (length, outcome) in outcomes {
            match outcome {
                Ok(words) => {
                    log::info!("Completed fetch of {} words for length {}", words.len(), length);
                    results.insert(length, words);
                }
                Err(e) => {
                    log::error!("Error fetching words for length {}: {}", length, e);
                    results.insert(length, Vec::new());
                }
            }
        }
        results
    }

    fn cap_reached(&self, collected: usize) -> bool {
        self.options.max_words.is_some_and(|cap| collected >= cap)
    }

    /// Drop trailing words so the cap is never exceeded
    fn truncate_to_cap(&self, collected: usize, page_words: &mut Vec<WordInput>) {
        if let Some(cap) = self.options.max_words {
            let remaining = cap.saturating_sub(collected);
            page_words.truncate(remaining);
        }
    }

    /// Last page worth requesting given the cap and declared page size
    fn last_page_for_cap(&self, total_pages: u32) -> u32 {
        match self.options.max_words {
            Some(cap) if self.options.page_size > 0 => {
                // Widen before dividing so a cap above u32::MAX cannot wrap
                // into an artificially low page count
                let needed = (cap as u64).div_ceil(self.options.page_size as u64);
                let needed = u32::try_from(needed.max(1)).unwrap_or(u32::MAX);
                total_pages.min(needed)
            }
            _ => total_pages,
        }
    }
}

fn mirror(buffer: &SharedWords, words: &[WordInput]) {
    if let Ok(mut shared) = buffer.lock() {
        *shared = words.to_vec();
    }
}
