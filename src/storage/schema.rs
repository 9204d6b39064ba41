//! Database schema definitions

/// Database schema version
pub const SCHEMA_VERSION: u32 = 1;

/// SQL for creating the words table
pub const CREATE_WORDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE,
    length INTEGER NOT NULL,
    points INTEGER NOT NULL,
    dict_flags INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQL for creating the dictionary registry table
pub const CREATE_DICTIONARIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS dictionaries (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    bit_position INTEGER NOT NULL UNIQUE
);
"#;

/// SQL for creating the metadata table
pub const CREATE_METADATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQL for creating indexes on the words table for indexed lookups
pub const CREATE_WORDS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_words_word ON words(word);
CREATE INDEX IF NOT EXISTS idx_words_length ON words(length);
CREATE INDEX IF NOT EXISTS idx_words_length_points ON words(length, points DESC);
"#;

/// Dictionary registry seed for the reference deployment.
///
/// Seeded into the dictionaries table once at store initialization; the
/// table, not this constant, is authoritative after that point.
pub const DEFAULT_DICTIONARIES: &[(&str, u8)] = &[
    ("octordle", 0),
    ("otcwl", 1),
    ("quordle", 2),
    ("sowpods", 3),
    ("wordle", 4),
    ("wwf", 5),
];
