//! SQL schema for the BingeBox SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per annotation collection. The whole JSON array is rewritten on
-- every change, so a row is never partially updated.
CREATE TABLE IF NOT EXISTS annotations (
    storage_key TEXT PRIMARY KEY,   -- 'movieRatings' | 'movieFavorites' | 'movieComments'
    value_json  TEXT NOT NULL,      -- JSON array of records
    updated_at  TEXT NOT NULL       -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
