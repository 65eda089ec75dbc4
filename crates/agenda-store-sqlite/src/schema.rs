//! SQL schema for the agenda SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per contact. Rows are returned in rowid (insertion) order.
CREATE TABLE IF NOT EXISTS users (
    contact_id   TEXT PRIMARY KEY,
    nombre       TEXT NOT NULL,
    telefono     TEXT NOT NULL,
    pais         TEXT NOT NULL,   -- derived from the phone validation
    hora_actual  TEXT NOT NULL    -- derived from the world time lookup
);

-- At most one contact per phone number, enforced at write time.
CREATE UNIQUE INDEX IF NOT EXISTS users_telefono_idx ON users(telefono);

PRAGMA user_version = 1;
";
