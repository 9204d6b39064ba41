//! SQLite word store for wordcache
//!
//! This module provides the durable, indexed word store. Every public method
//! opens its own short-lived connection; no handle is cached across calls.
//! Batch writes are serialized by a process-wide lock, reads never take it.

use crate::error::{Result, WordCacheError};
use crate::storage::flags::DictRegistry;
use crate::storage::schema::*;
use crate::storage::{SizeInfo, WordInput, WordRecord, WordStatistics};
use crate::utils;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Conjunctive search filter; absent fields impose no constraint
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Wildcard pattern over the whole word (`?` = one char, `*` = any run)
    pub pattern: Option<String>,

    /// Case-insensitive substring filter
    pub contains: Option<String>,

    /// Inclusive lower bound on points
    pub min_points: Option<u32>,

    /// Inclusive upper bound on points
    pub max_points: Option<u32>,
}

/// Durable word store with indexed queries
#[derive(Clone)]
pub struct WordStore {
    path: PathBuf,
    registry: DictRegistry,
    write_lock: Arc<Mutex<()>>,
}

impl WordStore {
    /// Open (creating if absent) the word store at the given path.
    ///
    /// Applies the schema idempotently and seeds the dictionary registry.
    /// Failure here is fatal to startup.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        utils::ensure_parent_directory(&path)?;

        let conn = Connection::open(&path)
            .map_err(|e| WordCacheError::Storage(format!("Failed to open database: {}", e)))?;

        // Enable WAL mode for better concurrency
        let _: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| WordCacheError::Storage(format!("Failed to enable WAL mode: {}", e)))?;

        conn.execute(CREATE_WORDS_TABLE, [])
            .map_err(|e| WordCacheError::Storage(format!("Failed to create words table: {}", e)))?;

        conn.execute(CREATE_DICTIONARIES_TABLE, []).map_err(|e| {
            WordCacheError::Storage(format!("Failed to create dictionaries table: {}", e))
        })?;

        conn.execute(CREATE_METADATA_TABLE, []).map_err(|e| {
            WordCacheError::Storage(format!("Failed to create metadata table: {}", e))
        })?;

        conn.execute_batch(CREATE_WORDS_INDEXES)
            .map_err(|e| WordCacheError::Storage(format!("Failed to create indexes: {}", e)))?;

        // Seed the registry once; existing rows stay untouched
        for (id, (name, bit)) in DEFAULT_DICTIONARIES.iter().enumerate() {
            conn.execute(
                "INSERT OR IGNORE INTO dictionaries (id, name, bit_position) VALUES (?, ?, ?)",
                params![id as i64 + 1, name, *bit as i64],
            )
            .map_err(|e| {
                WordCacheError::Storage(format!("Failed to seed dictionary {}: {}", name, e))
            })?;
        }

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value, updated_at) VALUES ('schema_version', ?, ?)",
            params![SCHEMA_VERSION.to_string(), now],
        )
        .map_err(|e| WordCacheError::Storage(format!("Failed to set schema version: {}", e)))?;
        conn.execute(
            "INSERT OR IGNORE INTO metadata (key, value, updated_at) VALUES ('created_at', ?, ?)",
            params![now, now],
        )
        .map_err(|e| WordCacheError::Storage(format!("Failed to record creation time: {}", e)))?;

        let registry = Self::load_registry(&conn)?;

        log::info!(
            "Word store initialized at {} (schema version {}, {} dictionaries)",
            path.display(),
            SCHEMA_VERSION,
            registry.len()
        );

        Ok(Self {
            path,
            registry,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn load_registry(conn: &Connection) -> Result<DictRegistry> {
        let mut stmt = conn
            .prepare("SELECT name, bit_position FROM dictionaries ORDER BY bit_position")
            .map_err(|e| {
                WordCacheError::Storage(format!("Failed to prepare registry query: {}", e))
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u8))
            })
            .map_err(|e| WordCacheError::Storage(format!("Failed to load registry: {}", e)))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| {
                WordCacheError::Storage(format!("Failed to read registry row: {}", e))
            })?);
        }

        Ok(DictRegistry::new(entries))
    }

    /// Per-call connection; released when the call returns
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(|e| WordCacheError::Storage(format!("Failed to open database: {}", e)))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(|e| WordCacheError::Storage(format!("Failed to set busy timeout: {}", e)))?;
        Ok(conn)
    }

    /// The dictionary registry loaded at initialization
    pub fn registry(&self) -> &DictRegistry {
        &self.registry
    }

    /// Insert or replace a batch of words in one transaction.
    ///
    /// Conflicting words keep their `created_at` but take the incoming
    /// `points` and `dict_flags` wholesale (last write wins, no bit merging)
    /// and get a refreshed `updated_at`. Returns the number of rows written.
    pub fn upsert_batch(&self, records: &[WordInput]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| WordCacheError::Storage("Write lock poisoned".to_string()))?;

        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| WordCacheError::Storage(format!("Failed to start transaction: {}", e)))?;

        let mut written = 0usize;
        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO words (word, length, points, dict_flags, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    ON CONFLICT(word) DO UPDATE SET
                        points = excluded.points,
                        dict_flags = excluded.dict_flags,
                        updated_at = excluded.updated_at
                    "#,
                )
                .map_err(|e| {
                    WordCacheError::Storage(format!("Failed to prepare upsert: {}", e))
                })?;

            let now = Utc::now().to_rfc3339();
            for record in records {
                let flags = self.registry.encode(&record.dict_matches);
                let length = record.word.chars().count() as i64;
                stmt.execute(params![
                    record.word,
                    length,
                    record.points as i64,
                    flags as i64,
                    now,
                    now,
                ])
                .map_err(|e| {
                    WordCacheError::Storage(format!(
                        "Failed to upsert word '{}': {}",
                        record.word, e
                    ))
                })?;
                written += 1;
            }
        }

        tx.commit()
            .map_err(|e| WordCacheError::Storage(format!("Failed to commit batch: {}", e)))?;

        log::info!("Upserted {} words into store", written);
        Ok(written)
    }

    /// Words of the given length, ordered by points descending - indexed lookup
    pub fn get_by_length(&self, length: u32, limit: Option<usize>) -> Result<Vec<WordRecord>> {
        let conn = self.connect()?;
        let mut sql = String::from(
            "SELECT word, length, points, dict_flags, created_at, updated_at \
             FROM words WHERE length = ? ORDER BY points DESC",
        );
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(length as i64)];

        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            values.push(Box::new(limit as i64));
        }

        self.query_records(&conn, &sql, &values)
    }

    /// Top N words by points, globally or for one length
    pub fn get_top(&self, length: Option<u32>, limit: usize) -> Result<Vec<WordRecord>> {
        let conn = self.connect()?;
        match length {
            Some(length) => self.query_records(
                &conn,
                "SELECT word, length, points, dict_flags, created_at, updated_at \
                 FROM words WHERE length = ? ORDER BY points DESC LIMIT ?",
                &[Box::new(length as i64), Box::new(limit as i64)],
            ),
            None => self.query_records(
                &conn,
                "SELECT word, length, points, dict_flags, created_at, updated_at \
                 FROM words ORDER BY points DESC LIMIT ?",
                &[Box::new(limit as i64)],
            ),
        }
    }

    /// Filtered search; all provided filters AND together
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<WordRecord>> {
        let conn = self.connect()?;
        let mut sql = String::from(
            "SELECT word, length, points, dict_flags, created_at, updated_at \
             FROM words WHERE 1=1",
        );
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(pattern) = &filter.pattern {
            sql.push_str(" AND word LIKE ? ESCAPE '\\'");
            values.push(Box::new(compile_wildcard(pattern)));
        }
        if let Some(contains) = &filter.contains {
            sql.push_str(" AND instr(lower(word), lower(?)) > 0");
            values.push(Box::new(contains.clone()));
        }
        if let Some(min) = filter.min_points {
            sql.push_str(" AND points >= ?");
            values.push(Box::new(min as i64));
        }
        if let Some(max) = filter.max_points {
            sql.push_str(" AND points <= ?");
            values.push(Box::new(max as i64));
        }

        sql.push_str(" ORDER BY points DESC");
        self.query_records(&conn, &sql, &values)
    }

    /// Aggregate statistics, globally or for one length
    pub fn statistics(&self, length: Option<u32>) -> Result<WordStatistics> {
        let conn = self.connect()?;

        let (sql, values): (&str, Vec<Box<dyn ToSql>>) = match length {
            Some(length) => (
                "SELECT COUNT(*), AVG(points), MAX(points), MIN(points), SUM(points) \
                 FROM words WHERE length = ?",
                vec![Box::new(length as i64)],
            ),
            None => (
                "SELECT COUNT(*), AVG(points), MAX(points), MIN(points), SUM(points) FROM words",
                vec![],
            ),
        };

        let params = rusqlite::params_from_iter(values.iter().map(|v| v.as_ref()));
        let (total, avg, max, min, sum) = conn
            .query_row(sql, params, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                ))
            })
            .map_err(|e| WordCacheError::Storage(format!("Failed to compute statistics: {}", e)))?;

        let max = max.unwrap_or(0);
        let highest_word = if total > 0 {
            let word: Option<String> = match length {
                Some(length) => conn
                    .query_row(
                        "SELECT word FROM words WHERE length = ? AND points = ? LIMIT 1",
                        params![length as i64, max],
                        |row| row.get(0),
                    )
                    .optional(),
                None => conn
                    .query_row(
                        "SELECT word FROM words WHERE points = ? LIMIT 1",
                        params![max],
                        |row| row.get(0),
                    )
                    .optional(),
            }
            .map_err(|e| {
                WordCacheError::Storage(format!("Failed to find highest word: {}", e))
            })?;
            word.unwrap_or_default()
        } else {
            String::new()
        };

        Ok(WordStatistics {
            total_words: total as u64,
            average_points: (avg.unwrap_or(0.0) * 100.0).round() / 100.0,
            highest_points: max as u32,
            lowest_points: min.unwrap_or(0) as u32,
            total_points: sum.unwrap_or(0) as u64,
            highest_word,
        })
    }

    /// Word count per length, ascending by length - full table scan
    pub fn length_distribution(&self) -> Result<BTreeMap<u32, u64>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT length, COUNT(*) FROM words GROUP BY length ORDER BY length")
            .map_err(|e| {
                WordCacheError::Storage(format!("Failed to prepare distribution query: {}", e))
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)? as u32, row.get::<_, i64>(1)? as u64))
            })
            .map_err(|e| {
                WordCacheError::Storage(format!("Failed to query distribution: {}", e))
            })?;

        let mut distribution = BTreeMap::new();
        for row in rows {
            let (length, count) = row.map_err(|e| {
                WordCacheError::Storage(format!("Failed to read distribution row: {}", e))
            })?;
            distribution.insert(length, count);
        }
        Ok(distribution)
    }

    /// Number of stored words of the given length
    pub fn count_for_length(&self, length: u32) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM words WHERE length = ?",
                params![length as i64],
                |row| row.get(0),
            )
            .map_err(|e| WordCacheError::Storage(format!("Failed to count words: {}", e)))?;
        Ok(count as u64)
    }

    /// Backing file size, read fresh from filesystem metadata
    pub fn size_info(&self) -> Result<SizeInfo> {
        let metadata = std::fs::metadata(&self.path)?;
        Ok(SizeInfo {
            size_bytes: metadata.len(),
            size_formatted: utils::format_file_size(metadata.len()),
            file_path: self.path.display().to_string(),
        })
    }

    /// Write a store-level metadata fact
    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| WordCacheError::Storage(format!("Failed to set metadata {}: {}", key, e)))?;
        Ok(())
    }

    /// Read a store-level metadata fact (diagnostics only)
    pub fn metadata(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT value FROM metadata WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| WordCacheError::Storage(format!("Failed to read metadata {}: {}", key, e)))
    }

    fn query_records(
        &self,
        conn: &Connection,
        sql: &str,
        values: &[Box<dyn ToSql>],
    ) -> Result<Vec<WordRecord>> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| WordCacheError::Storage(format!("Failed to prepare query: {}", e)))?;

        let params = rusqlite::params_from_iter(values.iter().map(|v| v.as_ref()));
        let rows = stmt
            .query_map(params, row_to_record)
            .map_err(|e| WordCacheError::Storage(format!("Failed to query words: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(
                row.map_err(|e| {
                    WordCacheError::Storage(format!("Failed to read word row: {}", e))
                })?,
            );
        }
        Ok(records)
    }
}

fn row_to_record(row: &Row) -> rusqlite::Result<WordRecord> {
    Ok(WordRecord {
        word: row.get(0)?,
        length: row.get::<_, i64>(1)? as u32,
        points: row.get::<_, i64>(2)? as u32,
        dict_flags: row.get::<_, i64>(3)? as u64,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Translate a `?`/`*` wildcard pattern to SQLite LIKE syntax.
///
/// Compiled once per query. Literal `%`, `_` and `\` are escaped so the
/// pattern matches the literal word value.
fn compile_wildcard(pattern: &str) -> String {
    let mut compiled = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '?' => compiled.push('_'),
            '*' => compiled.push('%'),
            '%' | '_' | '\\' => {
                compiled.push('\\');
                compiled.push(c);
            }
            c => compiled.push(c),
        }
    }
    compiled
}
