//! `SQLite` schema for the key-value store.

/// SQL statement to create the key-value table.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Insert or overwrite one key.
pub const UPSERT_VALUE: &str = r"
INSERT INTO kv_store (key, value, updated_at)
VALUES (?1, ?2, datetime('now'))
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

/// Read one key.
pub const SELECT_VALUE: &str = "SELECT value FROM kv_store WHERE key = ?1";

/// Delete one key.
pub const DELETE_VALUE: &str = "DELETE FROM kv_store WHERE key = ?1";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_KV_TABLE];
