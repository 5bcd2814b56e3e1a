//! SQL schema for the civic SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS agencies (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,           -- opaque; never cleartext
    description   TEXT,
    created_at    TEXT NOT NULL            -- RFC 3339 UTC, microseconds; server-assigned
);

-- Reports are append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS reports (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    agency_id       INTEGER REFERENCES agencies(id),
    message         TEXT NOT NULL,
    image_path      TEXT,
    latitude        TEXT,                  -- decimal text, scale as submitted
    longitude       TEXT,
    location_method TEXT,
    created_at      TEXT NOT NULL,
    CHECK ((latitude IS NULL) = (longitude IS NULL)),
    CHECK (location_method IS NULL OR latitude IS NOT NULL)
);

CREATE INDEX IF NOT EXISTS reports_agency_idx  ON reports(agency_id, created_at);
CREATE INDEX IF NOT EXISTS reports_created_idx ON reports(created_at);

PRAGMA user_version = 1;
";
