//! SQL schema for the Census SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 UTC strings (nanosecond precision,
/// `Z` suffix), so text comparison orders them chronologically.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS persons (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL CHECK (trim(name) <> ''),
    gender         TEXT,
    email          TEXT,
    birth_date     TEXT NOT NULL,
    place_of_birth TEXT,
    nationality    TEXT,
    tax_id         TEXT NOT NULL CHECK (length(tax_id) = 11),
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    CHECK (created_at <= updated_at)
);

-- Final arbiter for concurrent creates carrying the same tax id.
CREATE UNIQUE INDEX IF NOT EXISTS persons_tax_id_idx ON persons(tax_id);

PRAGMA user_version = 1;
";
