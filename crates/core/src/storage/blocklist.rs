use rusqlite::params;

use crate::blocklist::{BlockListKind, BlocklistEntry, BlocklistStore, PendingBlock};

use super::{from_sql_id, to_sql_id, SqliteStore, StoreError};

fn table(kind: BlockListKind) -> &'static str {
    match kind {
        BlockListKind::Always => "block_always",
        BlockListKind::Block => "blocklist",
        BlockListKind::Never => "block_never",
    }
}

impl BlocklistStore for SqliteStore {
    fn add_candidates(&self, ids: &[u64], kind: BlockListKind) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        // always entries also land on the block list
        let tables = match kind {
            BlockListKind::Always => vec!["blocklist", "block_always"],
            other => vec![table(other)],
        };

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut added = 0;
        for (i, table) in tables.iter().enumerate() {
            let mut stmt = tx.prepare(&format!("INSERT OR IGNORE INTO {} (id) VALUES (?)", table))?;
            for id in ids {
                let n = stmt.execute(params![to_sql_id(*id)])?;
                if i == tables.len() - 1 {
                    added += n;
                }
            }
        }
        tx.commit()?;

        Ok(added)
    }

    fn contains(&self, id: u64, kind: BlockListKind) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?", table(kind)),
            params![to_sql_id(id)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn remove(&self, id: u64) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM blocklist WHERE id = ?", params![to_sql_id(id)])?;
        Ok(())
    }

    fn pending_blocks(&self) -> Result<Vec<PendingBlock>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT p.id, p.screen_name FROM blocklist b
             JOIN profiles p ON p.id = b.id
             WHERE p.screen_name IS NOT NULL
               AND p.screen_name NOT IN ('[NOT_FOUND]', '[SUSPENDED]')
               AND b.id NOT IN (SELECT id FROM block_never)
             ORDER BY b.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PendingBlock {
                    id: from_sql_id(row.get(0)?),
                    screen_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn find_unlisted_matching(&self, term: &str) -> Result<Vec<u64>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let term = term.to_lowercase();

        // SQLite LOWER() only folds ASCII, so the comparison happens here
        let mut stmt = conn.prepare(
            "SELECT id, name, description, location FROM profiles
             WHERE screen_name IS NOT NULL
               AND screen_name NOT IN ('[NOT_FOUND]', '[SUSPENDED]')
               AND id NOT IN (SELECT id FROM blocklist)
               AND id NOT IN (SELECT id FROM block_never)
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let fields: [Option<String>; 3] = [row.get(1)?, row.get(2)?, row.get(3)?];
                Ok((row.get::<_, i64>(0)?, fields))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let ids = rows
            .into_iter()
            .filter(|(_, fields)| {
                fields
                    .iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&term))
            })
            .map(|(id, _)| from_sql_id(id))
            .collect();

        Ok(ids)
    }

    fn entries(&self) -> Result<Vec<BlocklistEntry>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT b.id, COALESCE(p.screen_name, ''), p.name, p.description, p.location
             FROM blocklist b
             JOIN profiles p ON p.id = b.id
             ORDER BY b.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(BlocklistEntry {
                    id: from_sql_id(row.get(0)?),
                    screen_name: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    location: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
