//! SQL schema for the Gatehouse SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS visitors (
    visitor_id    TEXT PRIMARY KEY,
    name          TEXT,
    purpose       TEXT,
    mobile        TEXT NOT NULL,
    target_flat   TEXT NOT NULL,
    photo         TEXT,
    status        TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'approved' | 'rejected'
    entry_time    TEXT NOT NULL,                    -- ISO 8601 UTC; server-assigned
    approval_time TEXT                              -- NULL while pending
);

-- Directory accounts. Only push_token is ever updated by this service.
CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    phone       TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    role        TEXT NOT NULL,     -- 'guard' | 'resident' | 'admin'
    flat_number TEXT,
    push_token  TEXT,
    created_at  TEXT NOT NULL
);

-- Announcements are append-only.
CREATE TABLE IF NOT EXISTS announcements (
    announcement_id TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    message         TEXT NOT NULL,
    target          TEXT NOT NULL DEFAULT 'all',  -- 'all' | 'resident' | 'guard'
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS visitors_flat_idx         ON visitors(target_flat);
CREATE INDEX IF NOT EXISTS visitors_entry_idx        ON visitors(entry_time);
CREATE INDEX IF NOT EXISTS users_flat_idx            ON users(flat_number);
CREATE INDEX IF NOT EXISTS announcements_target_idx  ON announcements(target);

PRAGMA user_version = 1;
";
