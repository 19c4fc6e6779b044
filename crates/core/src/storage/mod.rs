//! SQLite-backed storage shared by profiles, lists, scan jobs and tokens.
//!
//! One connection serves every store trait so cross-table queries (block
//! list joined with profiles) stay in one place.

mod blocklist;
mod profiles;
mod scan_jobs;
mod tokens;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;

use crate::token::{HexCipher, TokenCipher};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// SQLite-backed store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    cipher: Box<dyn TokenCipher>,
}

impl SqliteStore {
    /// Open or create the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            cipher: Box::new(HexCipher),
        })
    }

    /// Seal tokens with this cipher instead of [`HexCipher`].
    pub fn with_cipher(mut self, cipher: Box<dyn TokenCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id INTEGER PRIMARY KEY,
                screen_name TEXT,
                name TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                followers_count INTEGER NOT NULL DEFAULT 0,
                friends_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL DEFAULT 0,
                verified INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_profiles_screen_name ON profiles(screen_name);

            CREATE TABLE IF NOT EXISTS blocklist (id INTEGER PRIMARY KEY);
            CREATE TABLE IF NOT EXISTS block_always (id INTEGER PRIMARY KEY);
            CREATE TABLE IF NOT EXISTS block_never (id INTEGER PRIMARY KEY);

            CREATE TABLE IF NOT EXISTS scan_jobs (
                id INTEGER PRIMARY KEY,
                screen_name TEXT NOT NULL UNIQUE,
                finished INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS tokens (
                user_id INTEGER PRIMARY KEY,
                screen_name TEXT NOT NULL,
                token TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

/// Account ids are u64; SQLite INTEGER is i64. The cast keeps every bit.
pub(crate) fn to_sql_id(id: u64) -> i64 {
    id as i64
}

pub(crate) fn from_sql_id(id: i64) -> u64 {
    id as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_cast_preserves_bits() {
        for id in [0u64, 1, 1_452_470_575_137_660_930, u64::MAX, 1 << 63] {
            assert_eq!(from_sql_id(to_sql_id(id)), id);
        }
    }

    #[test]
    fn test_schema_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        let conn = store.conn.lock().unwrap();
        SqliteStore::initialize_schema(&conn).unwrap();
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("termblock.db");

        SqliteStore::new(&db_path).unwrap();
        assert!(db_path.exists());

        // reopening keeps the schema
        SqliteStore::new(&db_path).unwrap();
    }
}
