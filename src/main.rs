//! wordcache CLI application
//!
//! Command-line interface for the wordcache library.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wordcache::storage::SearchFilter;
use wordcache::{
    CancelToken, Config, FetchOptions, Fetcher, HttpSearchClient, LegacyImporter, MergePipeline,
    WordStore,
};

#[derive(Parser)]
#[command(name = "wordcache")]
#[command(about = "A local SQLite cache of word-game vocabulary with paginated remote fetch")]
#[command(version)]
struct Cli {
    /// Path to the word store database file
    #[arg(short, long, default_value = "database/word_database.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch words for one or more lengths from the remote service
    Fetch {
        /// Word length(s) to fetch
        #[arg(required = true)]
        lengths: Vec<u32>,

        /// Words requested per page
        #[arg(long, default_value = "50")]
        page_size: u32,

        /// Stop after collecting this many words per length
        #[arg(long)]
        max_words: Option<usize>,

        /// Fetch all lengths concurrently instead of one at a time
        #[arg(long)]
        concurrent: bool,
    },

    /// Search cached words with wildcard, substring and point filters
    Search {
        /// Wildcard pattern over the whole word (? = one char, * = any run)
        #[arg(short, long)]
        pattern: Option<String>,

        /// Case-insensitive substring filter
        #[arg(short, long)]
        contains: Option<String>,

        /// Inclusive lower bound on points
        #[arg(long)]
        min_points: Option<u32>,

        /// Inclusive upper bound on points
        #[arg(long)]
        max_points: Option<u32>,

        /// Number of results to show
        #[arg(short = 'n', long, default_value = "25")]
        limit: usize,
    },

    /// Show the top scoring cached words
    Top {
        /// Restrict to one word length
        #[arg(short, long)]
        length: Option<u32>,

        /// Number of words to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Show store statistics
    Stats {
        /// Restrict to one word length
        #[arg(short, long)]
        length: Option<u32>,
    },

    /// Show word count per length
    Lengths,

    /// Show backing file size
    Size,

    /// Import a legacy JSON database file
    Import {
        /// Legacy database file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let store = WordStore::open(&cli.database)?;

    // A pending legacy file is picked up no matter which command runs
    migrate_legacy_if_present(&MergePipeline::new(store.clone()), Path::new("database.json"));

    match cli.command {
        Commands::Fetch {
            lengths,
            page_size,
            max_words,
            concurrent,
        } => {
            fetch_command(store, lengths, page_size, max_words, concurrent).await?;
        }
        Commands::Search {
            pattern,
            contains,
            min_points,
            max_points,
            limit,
        } => {
            let filter = SearchFilter {
                pattern,
                contains,
                min_points,
                max_points,
            };
            search_command(&store, &filter, limit)?;
        }
        Commands::Top { length, limit } => {
            top_command(&store, length, limit)?;
        }
        Commands::Stats { length } => {
            stats_command(&store, length)?;
        }
        Commands::Lengths => {
            lengths_command(&store)?;
        }
        Commands::Size => {
            let info = store.size_info()?;
            println!("📦 {} ({} bytes)", info.size_formatted, info.size_bytes);
            println!("   {}", info.file_path);
        }
        Commands::Import { file } => {
            import_command(&store, &file)?;
        }
    }

    Ok(())
}

async fn fetch_command(
    store: WordStore,
    lengths: Vec<u32>,
    page_size: u32,
    max_words: Option<usize>,
    concurrent: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let pipeline = MergePipeline::new(store.clone());

    let cancel = CancelToken::new();

    // The binary is the signal collaborator: ctrl-c flips the token once
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let mut options = FetchOptions::from_config(&config.fetch);
    options.page_size = page_size;
    options.max_words = max_words;

    let fetcher = Fetcher::new(
        HttpSearchClient::new(&config.fetch)?,
        pipeline,
        cancel.clone(),
        options,
    );

    let snapshot = fetcher.partial_handle();
    cancel.on_cancel(move || {
        println!(
            "\n⏸️  Stop requested - {} words collected so far, finishing the current page...",
            snapshot.snapshot().len()
        );
    });

    println!(
        "🔄 Fetching lengths {:?} ({} mode)...",
        lengths,
        if concurrent { "concurrent" } else { "sequential" }
    );
    println!("   Press Ctrl+C at any time to stop gracefully and save partial results");

    let results = if concurrent {
        fetcher.fetch_lengths_concurrent(&lengths).await
    } else {
        let progress = |done: u32, total: u32, message: &str| {
            println!("   [{}/{}] {}", done, total, message);
        };
        fetcher.fetch_lengths_sequential(&lengths, Some(&progress)).await
    };

    let total: usize = results.values().map(|words| words.len()).sum();
    if cancel.is_cancelled() {
        println!("⏹️  Stopped early with {} words collected", total);
    } else {
        println!("✅ Fetch complete: {} words across {} lengths", total, results.len());
    }

    let mut lengths: Vec<&u32> = results.keys().collect();
    lengths.sort();
    for length in lengths {
        println!("   Length {}: {} words", length, results[length].len());
    }

    let info = store.size_info()?;
    println!("   Store size: {}", info.size_formatted);

    Ok(())
}

fn search_command(
    store: &WordStore,
    filter: &SearchFilter,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = store.search(filter)?;

    if results.is_empty() {
        println!("❌ No matching words");
        return Ok(());
    }

    println!("📋 Found {} matching words:", results.len());
    for record in results.iter().take(limit) {
        let memberships = store.registry().decode(record.dict_flags);
        let mut dicts: Vec<&str> = memberships
            .iter()
            .filter(|(_, member)| **member)
            .map(|(name, _)| name.as_str())
            .collect();
        dicts.sort();
        println!(
            "   {:<15} {:>4} points  [{}]",
            record.word,
            record.points,
            dicts.join(", ")
        );
    }
    if results.len() > limit {
        println!("   ... and {} more", results.len() - limit);
    }

    Ok(())
}

fn top_command(
    store: &WordStore,
    length: Option<u32>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = store.get_top(length, limit)?;

    if results.is_empty() {
        println!("❌ No cached words");
        return Ok(());
    }

    match length {
        Some(length) => println!("🏆 Top {} words of length {}:", results.len(), length),
        None => println!("🏆 Top {} words:", results.len()),
    }
    for (i, record) in results.iter().enumerate() {
        println!("   {}. {:<15} {} points", i + 1, record.word, record.points);
    }

    Ok(())
}

fn stats_command(store: &WordStore, length: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let stats = store.statistics(length)?;

    match length {
        Some(length) => println!("📊 Statistics for length {}:", length),
        None => println!("📊 Store statistics:"),
    }
    println!("   Total words:    {}", stats.total_words);
    println!("   Average points: {:.2}", stats.average_points);
    println!("   Highest points: {}", stats.highest_points);
    println!("   Lowest points:  {}", stats.lowest_points);
    println!("   Total points:   {}", stats.total_points);
    if !stats.highest_word.is_empty() {
        println!("   Highest word:   {}", stats.highest_word);
    }

    Ok(())
}

fn lengths_command(store: &WordStore) -> Result<(), Box<dyn std::error::Error>> {
    let distribution = store.length_distribution()?;

    if distribution.is_empty() {
        println!("❌ No cached words");
        return Ok(());
    }

    println!("📊 Words per length:");
    for (length, count) in distribution {
        println!("   {:>2} letters: {}", length, count);
    }

    Ok(())
}

fn import_command(store: &WordStore, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("📥 Importing legacy database from {}...", file.display());

    let importer = LegacyImporter::new(MergePipeline::new(store.clone()));
    if importer.import(file)? {
        println!("✅ Import complete");
        let info = store.size_info()?;
        println!("   Store size: {}", info.size_formatted);
    } else {
        println!("❌ No words found in legacy file");
    }

    Ok(())
}

/// One-time migration: pick up a legacy database.json sitting in the working
/// directory, import it, and move it aside so it only happens once.
fn migrate_legacy_if_present(pipeline: &MergePipeline, legacy: &Path) {
    if !legacy.exists() {
        return;
    }

    println!("📥 Found legacy database.json - migrating to SQLite...");
    let importer = LegacyImporter::new(pipeline.clone());
    match importer.import(legacy) {
        Ok(true) => {
            let backup = legacy.with_extension("json.backup");
            if let Err(e) = std::fs::rename(legacy, &backup) {
                log::warn!("Failed to move legacy file aside: {}", e);
            } else {
                println!(
                    "   Migration complete, legacy file backed up as {}",
                    backup.display()
                );
            }
        }
        Ok(false) => println!("   Legacy file contained no words, leaving it in place"),
        Err(e) => println!("   Migration failed ({}), continuing with existing store", e),
    }
}
