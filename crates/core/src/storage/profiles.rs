use rusqlite::params;

use crate::profile::{ProfileRecord, ProfileStatus, ProfileStore, Tombstone};

use super::{from_sql_id, to_sql_id, SqliteStore, StoreError};

impl ProfileStore for SqliteStore {
    fn upsert(&self, records: &[ProfileRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO profiles (id, screen_name, name, description, location, followers_count, friends_count, created_at, verified)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    screen_name = excluded.screen_name,
                    name = excluded.name,
                    description = excluded.description,
                    location = excluded.location,
                    followers_count = excluded.followers_count,
                    friends_count = excluded.friends_count,
                    created_at = excluded.created_at,
                    verified = excluded.verified",
            )?;

            for record in records {
                stmt.execute(params![
                    to_sql_id(record.id),
                    record.screen_name,
                    record.name,
                    record.description,
                    record.location,
                    record.followers_count as i64,
                    record.friends_count as i64,
                    record.created_at,
                    record.verified,
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn insert_ids(&self, ids: &[u64]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO profiles (id) VALUES (?)")?;
            for id in ids {
                inserted += stmt.execute(params![to_sql_id(*id)])?;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn mark_not_found(&self, ids: &[u64]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE profiles SET screen_name = ? WHERE id = ?")?;
            for id in ids {
                stmt.execute(params![Tombstone::NotFound.as_str(), to_sql_id(*id)])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn select_unscanned_ids(&self, limit: usize) -> Result<Vec<u64>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT id FROM profiles WHERE screen_name IS NULL ORDER BY id LIMIT ?")?;
        let ids = stmt
            .query_map(params![limit as i64], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids.into_iter().map(from_sql_id).collect())
    }

    fn status(&self, id: u64) -> Result<Option<ProfileStatus>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT screen_name, name, description, location, followers_count, friends_count, created_at, verified FROM profiles WHERE id = ?",
            params![to_sql_id(id)],
            |row| {
                let screen_name: Option<String> = row.get(0)?;
                Ok(match screen_name {
                    None => ProfileStatus::Unscanned,
                    Some(name) => match Tombstone::parse(&name) {
                        Some(tombstone) => ProfileStatus::Tombstoned(tombstone),
                        None => ProfileStatus::Scanned(ProfileRecord {
                            id,
                            screen_name: name,
                            name: row.get(1)?,
                            description: row.get(2)?,
                            location: row.get(3)?,
                            followers_count: row.get::<_, i64>(4)? as u64,
                            friends_count: row.get::<_, i64>(5)? as u64,
                            created_at: row.get(6)?,
                            verified: row.get(7)?,
                        }),
                    },
                })
            },
        );

        match result {
            Ok(status) => Ok(Some(status)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
