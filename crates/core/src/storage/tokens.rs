use chrono::Utc;
use rusqlite::params;

use crate::token::{Identity, TokenError, TokenStore};

use super::{from_sql_id, to_sql_id, SqliteStore, StoreError};

impl TokenStore for SqliteStore {
    fn store(&self, identity: &Identity, token: &str) -> Result<(), TokenError> {
        let sealed = self.cipher.seal(token)?;
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO tokens (user_id, screen_name, token, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                screen_name = excluded.screen_name,
                token = excluded.token,
                updated_at = excluded.updated_at",
            params![
                to_sql_id(identity.user_id),
                identity.screen_name,
                sealed,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(StoreError::from)?;

        Ok(())
    }

    fn get(&self, user_id: u64) -> Result<Option<String>, TokenError> {
        let sealed = {
            let conn = self.conn.lock().unwrap();
            let result = conn.query_row(
                "SELECT token FROM tokens WHERE user_id = ?",
                params![to_sql_id(user_id)],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(sealed) => sealed,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(StoreError::from(e).into()),
            }
        };

        Ok(Some(self.cipher.open(&sealed)?))
    }

    fn get_by_screen_name(
        &self,
        screen_name: &str,
    ) -> Result<Option<(Identity, String)>, TokenError> {
        let row = {
            let conn = self.conn.lock().unwrap();
            let result = conn.query_row(
                "SELECT user_id, screen_name, token FROM tokens WHERE LOWER(screen_name) = LOWER(?)",
                params![screen_name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            );
            match result {
                Ok(row) => row,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(StoreError::from(e).into()),
            }
        };

        let (user_id, screen_name, sealed) = row;
        let identity = Identity {
            user_id: from_sql_id(user_id),
            screen_name,
        };
        Ok(Some((identity, self.cipher.open(&sealed)?)))
    }

    fn has(&self, user_id: u64) -> Result<bool, TokenError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tokens WHERE user_id = ?",
                params![to_sql_id(user_id)],
                |row| row.get(0),
            )
            .map_err(StoreError::from)?;
        Ok(count > 0)
    }

    fn clear(&self, user_id: u64) -> Result<(), TokenError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM tokens WHERE user_id = ?",
            params![to_sql_id(user_id)],
        )
        .map_err(StoreError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCipher;

    fn identity(user_id: u64, screen_name: &str) -> Identity {
        Identity {
            user_id,
            screen_name: screen_name.to_string(),
        }
    }

    /// Reverses the token, enough to tell sealed from plain values.
    struct ReverseCipher;

    impl TokenCipher for ReverseCipher {
        fn seal(&self, token: &str) -> Result<String, TokenError> {
            Ok(token.chars().rev().collect())
        }

        fn open(&self, sealed: &str) -> Result<String, TokenError> {
            Ok(sealed.chars().rev().collect())
        }
    }

    #[test]
    fn test_store_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        store.store(&identity(42, "Someone"), "secret").unwrap();

        assert!(store.has(42).unwrap());
        assert_eq!(store.get(42).unwrap().as_deref(), Some("secret"));
        assert_eq!(store.get(1).unwrap(), None);
    }

    #[test]
    fn test_replace_token() {
        let store = SqliteStore::in_memory().unwrap();
        store.store(&identity(42, "someone"), "old").unwrap();
        store.store(&identity(42, "renamed"), "new").unwrap();

        let (found, token) = store.get_by_screen_name("RENAMED").unwrap().unwrap();
        assert_eq!(found, identity(42, "renamed"));
        assert_eq!(token, "new");
        assert!(store.get_by_screen_name("someone").unwrap().is_none());
    }

    #[test]
    fn test_tokens_are_sealed_at_rest() {
        let store = SqliteStore::in_memory().unwrap().with_cipher(Box::new(ReverseCipher));
        store.store(&identity(1, "a"), "abc").unwrap();

        let raw: String = store
            .conn
            .lock()
            .unwrap()
            .query_row("SELECT token FROM tokens WHERE user_id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, "cba");
        assert_eq!(store.get(1).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_clear() {
        let store = SqliteStore::in_memory().unwrap();
        store.store(&identity(7, "seven"), "t").unwrap();
        store.clear(7).unwrap();
        assert!(!store.has(7).unwrap());
    }
}
