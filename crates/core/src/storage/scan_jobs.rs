use rusqlite::params;

use crate::scan::{ScanJob, ScanJobStore, ScanStatus};

use super::{from_sql_id, to_sql_id, SqliteStore, StoreError};

fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<ScanJob> {
    let finished: i64 = row.get(2)?;
    Ok(ScanJob {
        id: from_sql_id(row.get(0)?),
        screen_name: row.get(1)?,
        // unknown codes are treated as failed so they are never picked again
        status: ScanStatus::from_i64(finished).unwrap_or(ScanStatus::Failed),
    })
}

impl ScanJobStore for SqliteStore {
    fn add_jobs(&self, jobs: &[ScanJob]) -> Result<usize, StoreError> {
        if jobs.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO scan_jobs (id, screen_name, finished) VALUES (?, ?, ?)",
            )?;
            for job in jobs {
                added += stmt.execute(params![
                    to_sql_id(job.id),
                    job.screen_name,
                    job.status.as_i64()
                ])?;
            }
        }
        tx.commit()?;

        Ok(added)
    }

    fn next_pending(&self) -> Result<Option<ScanJob>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, screen_name, finished FROM scan_jobs WHERE finished = 0 ORDER BY id LIMIT 1",
            [],
            row_to_job,
        );

        match result {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_status(&self, id: u64, status: ScanStatus) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let rows = conn.execute(
            "UPDATE scan_jobs SET finished = ? WHERE id = ?",
            params![status.as_i64(), to_sql_id(id)],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("scan job {}", id)));
        }

        Ok(())
    }

    fn jobs(&self) -> Result<Vec<ScanJob>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare("SELECT id, screen_name, finished FROM scan_jobs ORDER BY id")?;
        let jobs = stmt
            .query_map([], row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }
}
