//! SQL schema for the Rota SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `AUTOINCREMENT` keeps SQLite from reusing the id of a deleted row. User
/// references are plain integers with no foreign keys: rows may outlive the
/// user they point at.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password      TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    role          TEXT NOT NULL,   -- 'admin' | 'manager' | 'employee'
    position      TEXT,
    department    TEXT,            -- free-form department name
    profile_image TEXT
);

CREATE TABLE IF NOT EXISTS departments (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE,
    color TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shifts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    date       TEXT NOT NULL,      -- YYYY-MM-DD
    start_time TEXT NOT NULL,      -- HH:MM:SS
    end_time   TEXT NOT NULL,
    department TEXT NOT NULL,
    notes      TEXT
);

CREATE TABLE IF NOT EXISTS time_off_requests (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    reason      TEXT,
    status      TEXT NOT NULL DEFAULT 'pending',
    created_at  TEXT NOT NULL,     -- RFC 3339 UTC, nanosecond precision
    reviewed_by INTEGER,
    reviewed_at TEXT
);

-- Append-only audit trail.
CREATE TABLE IF NOT EXISTS activities (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    type            TEXT NOT NULL,
    description     TEXT NOT NULL,
    user_id         INTEGER,
    related_user_id INTEGER,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id    INTEGER,          -- NULL for system notifications
    receiver_id  INTEGER NOT NULL,
    subject      TEXT,
    content      TEXT NOT NULL,
    is_read      INTEGER NOT NULL DEFAULT 0,
    priority     TEXT NOT NULL DEFAULT 'normal',
    message_type TEXT NOT NULL DEFAULT 'message',
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS shifts_user_idx        ON shifts(user_id);
CREATE INDEX IF NOT EXISTS shifts_date_idx        ON shifts(date);
CREATE INDEX IF NOT EXISTS time_off_user_idx      ON time_off_requests(user_id);
CREATE INDEX IF NOT EXISTS time_off_status_idx    ON time_off_requests(status);
CREATE INDEX IF NOT EXISTS activities_created_idx ON activities(created_at);
CREATE INDEX IF NOT EXISTS messages_receiver_idx  ON messages(receiver_id);
CREATE INDEX IF NOT EXISTS messages_sender_idx    ON messages(sender_id);

PRAGMA user_version = 1;
";
