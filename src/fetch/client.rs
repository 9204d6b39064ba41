//! Remote word-search client
//!
//! Wire types for the paginated search endpoint plus the HTTP client that
//! talks to it. The orchestrator depends only on the [`WordSearchApi`] trait,
//! so tests can drive it with a scripted in-memory service.

use crate::config::FetchConfig;
use crate::error::Result;
use crate::storage::WordInput;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Fixed request parameters for one page of one length
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub length: u32,

    /// Ordering key; always "points" so pages arrive points-descending
    pub word_sorting: String,

    pub group_by_length: bool,
    pub page_size: u32,
    pub dictionary: String,

    /// Zero-based page token; absent for the first request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<u32>,
}

impl SearchRequest {
    pub fn first_page(length: u32, page_size: u32, dictionary: &str) -> Self {
        Self {
            length,
            word_sorting: "points".to_string(),
            group_by_length: true,
            page_size,
            dictionary: dictionary.to_string(),
            page_token: None,
        }
    }

    pub fn with_page_token(&self, token: u32) -> Self {
        let mut request = self.clone();
        request.page_token = Some(token);
        request
    }
}

/// Pagination envelope returned by the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub word_pages: Vec<WordPage>,
}

impl SearchResponse {
    /// Words on this response's (single) result page
    pub fn page_words(&self) -> &[WordInput] {
        self.word_pages
            .first()
            .map(|page| page.word_list.as_slice())
            .unwrap_or(&[])
    }
}

/// One result page with the declared totals for its length
#[derive(Debug, Clone, Deserialize)]
pub struct WordPage {
    #[serde(default = "default_num_pages")]
    pub num_pages: u32,

    #[serde(default)]
    pub num_words: u32,

    #[serde(default)]
    pub word_list: Vec<WordInput>,
}

fn default_num_pages() -> u32 {
    1
}

/// Remote search endpoint abstraction
pub trait WordSearchApi {
    fn search(&self, request: SearchRequest)
    -> impl Future<Output = Result<SearchResponse>> + Send;
}

/// HTTP client for the real search endpoint
#[derive(Clone)]
pub struct HttpSearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchClient {
    /// Build a client with the configured bounded request timeout
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl WordSearchApi for HttpSearchClient {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse>> + Send {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        async move {
            let response = client
                .get(&base_url)
                .query(&request)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.json::<SearchResponse>().await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_request_has_no_token() {
        let request = SearchRequest::first_page(4, 50, "all_en");
        assert_eq!(request.length, 4);
        assert_eq!(request.word_sorting, "points");
        assert!(request.page_token.is_none());

        let page2 = request.with_page_token(1);
        assert_eq!(page2.page_token, Some(1));
        assert!(request.page_token.is_none());
    }

    #[test]
    fn test_envelope_deserializes_with_defaults() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "word_pages": [{
                    "num_pages": 3,
                    "num_words": 6,
                    "word_list": [
                        {"word": "abcd", "points": 10, "dict_matches": {"wordle": true}},
                        {"word": "efgh", "points": 7}
                    ]
                }]
            }"#,
        )
        .unwrap();

        let page = &response.word_pages[0];
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.num_words, 6);
        assert_eq!(response.page_words().len(), 2);
        assert_eq!(response.page_words()[0].word, "abcd");
        assert!(response.page_words()[1].dict_matches.is_empty());
    }

    #[test]
    fn test_empty_envelope() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.word_pages.is_empty());
        assert!(response.page_words().is_empty());
    }
}
