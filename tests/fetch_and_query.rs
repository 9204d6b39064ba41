//! End-to-end tests: fetch from a scripted remote service, merge into a
//! fresh store, and exercise the query surface the way a consumer would.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wordcache::fetch::{SearchRequest, SearchResponse, WordPage, WordSearchApi};
use wordcache::storage::SearchFilter;
use wordcache::{
    CancelToken, FetchOptions, Fetcher, LegacyImporter, MergePipeline, Result, WordInput, WordStore,
};

fn word(w: &str, points: u32, dicts: &[&str]) -> WordInput {
    WordInput {
        word: w.to_string(),
        points,
        dict_matches: dicts.iter().map(|d| (d.to_string(), true)).collect(),
    }
}

/// Serves a fixed page script per length
#[derive(Clone)]
struct FakeService {
    pages_by_length: Arc<HashMap<u32, Vec<Vec<WordInput>>>>,
    requests: Arc<Mutex<Vec<(u32, Option<u32>)>>>,
}

impl FakeService {
    fn new(pages_by_length: HashMap<u32, Vec<Vec<WordInput>>>) -> Self {
        Self {
            pages_by_length: Arc::new(pages_by_length),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl WordSearchApi for FakeService {
    fn search(&self, request: SearchRequest) -> impl Future<Output = Result<SearchResponse>> + Send {
        let service = self.clone();
        async move {
            service
                .requests
                .lock()
                .unwrap()
                .push((request.length, request.page_token));

            let pages = service
                .pages_by_length
                .get(&request.length)
                .cloned()
                .unwrap_or_default();
            let num_words: u32 = pages.iter().map(|p| p.len() as u32).sum();
            let index = request.page_token.unwrap_or(0) as usize;

            Ok(SearchResponse {
                word_pages: vec![WordPage {
                    num_pages: pages.len().max(1) as u32,
                    num_words,
                    word_list: pages.get(index).cloned().unwrap_or_default(),
                }],
            })
        }
    }
}

fn test_options() -> FetchOptions {
    FetchOptions {
        page_size: 2,
        dictionary: "all_en".to_string(),
        page_delay: Duration::from_millis(0),
        length_delay: Duration::from_millis(0),
        max_words: None,
    }
}

fn service() -> FakeService {
    let mut pages = HashMap::new();
    pages.insert(
        3,
        vec![
            vec![word("zax", 19, &["sowpods"]), word("cat", 5, &["wordle", "otcwl"])],
            vec![word("dog", 4, &["wordle"])],
        ],
    );
    pages.insert(
        4,
        vec![
            vec![word("abcd", 10, &[]), word("efgh", 7, &[])],
            vec![word("ijkl", 9, &[]), word("mnop", 3, &[])],
            vec![word("qrst", 5, &[]), word("uvwx", 1, &[])],
        ],
    );
    FakeService::new(pages)
}

#[tokio::test]
async fn test_sequential_fetch_then_query() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = WordStore::open(dir.path().join("words.db"))?;
    let fetcher = Fetcher::new(
        service(),
        MergePipeline::new(store.clone()),
        CancelToken::new(),
        test_options(),
    );

    let results = fetcher.fetch_lengths_sequential(&[3, 4], None).await;
    assert_eq!(results[&3].len(), 3);
    assert_eq!(results[&4].len(), 6);

    // By-length contract: exactly the right words, points descending
    let threes: Vec<String> = store
        .get_by_length(3, None)?
        .into_iter()
        .map(|r| r.word)
        .collect();
    assert_eq!(threes, vec!["zax", "cat", "dog"]);

    let top: Vec<String> = store
        .get_top(Some(4), 3)?
        .into_iter()
        .map(|r| r.word)
        .collect();
    assert_eq!(top, vec!["abcd", "ijkl", "efgh"]);

    // Membership bits survive the round trip through the store
    let zax = &store.get_by_length(3, Some(1))?[0];
    let memberships = store.registry().decode(zax.dict_flags);
    assert!(memberships["sowpods"]);
    assert!(!memberships["wordle"]);

    let stats = store.statistics(None)?;
    assert_eq!(stats.total_words, 9);
    assert_eq!(stats.highest_word, "zax");

    let distribution = store.length_distribution()?;
    assert_eq!(distribution[&3], 3);
    assert_eq!(distribution[&4], 6);

    let filter = SearchFilter {
        pattern: Some("?j*".to_string()),
        ..Default::default()
    };
    let matched: Vec<String> = store.search(&filter)?.into_iter().map(|r| r.word).collect();
    assert_eq!(matched, vec!["ijkl"]);

    Ok(())
}

#[tokio::test]
async fn test_refetch_replaces_scores_in_place() -> std::result::Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    let store = WordStore::open(dir.path().join("words.db"))?;

    // Seed via legacy import, then refetch the same words with new points
    let legacy_file = dir.path().join("database.json");
    std::fs::write(
        &legacy_file,
        r#"{"word_pages": [{"word_list": [
            {"word": "abcd", "points": 1, "dict_matches": {"wordle": true}},
            {"word": "efgh", "points": 1}
        ]}]}"#,
    )?;
    let importer = LegacyImporter::new(MergePipeline::new(store.clone()));
    assert!(importer.import(&legacy_file)?);
    assert_eq!(store.statistics(Some(4))?.highest_points, 1);

    let fetcher = Fetcher::new(
        service(),
        MergePipeline::new(store.clone()),
        CancelToken::new(),
        test_options(),
    );
    fetcher.fetch_length(4).await?;

    // Still one row per word, with the fetched points winning
    assert_eq!(store.length_distribution()?[&4], 6);
    let abcd = store
        .get_by_length(4, None)?
        .into_iter()
        .find(|r| r.word == "abcd")
        .unwrap();
    assert_eq!(abcd.points, 10);
    // Last write wins: the imported wordle membership is gone
    assert!(!store.registry().decode(abcd.dict_flags)["wordle"]);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_fetch_shares_one_store() -> std::result::Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    let store = WordStore::open(dir.path().join("words.db"))?;
    let fetcher = Fetcher::new(
        service(),
        MergePipeline::new(store.clone()),
        CancelToken::new(),
        test_options(),
    );

    let results = fetcher.fetch_lengths_concurrent(&[3, 4]).await;
    assert_eq!(results[&3].len(), 3);
    assert_eq!(results[&4].len(), 6);
    assert_eq!(store.statistics(None)?.total_words, 9);

    Ok(())
}
