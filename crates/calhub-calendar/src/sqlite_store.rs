//! SQLite-backed calendar store.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calhub_core::DatabaseError;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::instrument;

use crate::error::CalendarError;
use crate::page::QueryPage;
use crate::query::CalendarQuery;
use crate::store::CalendarStore;
use crate::types::Calendar;

/// Calendar store over a single SQLite connection.
///
/// Cloning is cheap and shares the connection. Every call runs on the blocking
/// thread pool so callers never stall the async runtime.
#[derive(Clone)]
pub struct SqliteCalendarStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCalendarStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Errors
    /// Returns `CalendarError::Storage` if the database cannot be opened or the
    /// schema cannot be created.
    pub fn new<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self, CalendarError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    /// Returns `CalendarError::Storage` if the schema cannot be created.
    pub fn in_memory() -> Result<Self, CalendarError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CalendarError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), CalendarError> {
        if Self::detect_job_keyed_links(conn)? {
            Self::rekey_job_links(conn)?;
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS calendars (
                calendar_id TEXT PRIMARY KEY,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS calendar_jobs (
                calendar_id TEXT NOT NULL REFERENCES calendars(calendar_id) ON DELETE CASCADE,
                job_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (calendar_id, position)
            );

            CREATE INDEX IF NOT EXISTS idx_calendar_jobs_job ON calendar_jobs(job_id);
            "#,
        )
        .map_err(|e| {
            CalendarError::Storage(DatabaseError::MigrationFailed(e.to_string()))
        })?;
        Ok(())
    }

    /// Detect a `calendar_jobs` table keyed on (calendar_id, job_id), which
    /// collapses repeated job IDs.
    fn detect_job_keyed_links(conn: &Connection) -> Result<bool, CalendarError> {
        let table_exists: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='calendar_jobs'",
            [],
            |row| row.get(0),
        )?;
        if table_exists == 0 {
            return Ok(false);
        }

        let mut stmt = conn.prepare("PRAGMA table_info(calendar_jobs)")?;
        let columns = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, i32>(5)?))
        })?;
        let key_columns = columns.collect::<Result<Vec<_>, _>>()?;

        Ok(key_columns
            .iter()
            .any(|(name, pk)| name == "job_id" && *pk > 0))
    }

    /// Rebuild `calendar_jobs` keyed on (calendar_id, position), keeping its rows.
    fn rekey_job_links(conn: &Connection) -> Result<(), CalendarError> {
        tracing::info!("Migrating calendar_jobs to position-keyed schema");
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE calendar_jobs_rekeyed (
                calendar_id TEXT NOT NULL REFERENCES calendars(calendar_id) ON DELETE CASCADE,
                job_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (calendar_id, position)
            );
            INSERT INTO calendar_jobs_rekeyed (calendar_id, job_id, position)
                SELECT calendar_id, job_id, position FROM calendar_jobs;
            DROP TABLE calendar_jobs;
            ALTER TABLE calendar_jobs_rekeyed RENAME TO calendar_jobs;
            COMMIT;
            "#,
        )
        .map_err(|e| {
            CalendarError::Storage(DatabaseError::MigrationFailed(e.to_string()))
        })?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, R>(&self, f: F) -> Result<R, CalendarError>
    where
        F: FnOnce(&mut Connection) -> Result<R, CalendarError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .map_err(|e| {
            CalendarError::Storage(DatabaseError::QueryFailed(format!(
                "Storage task failed: {}",
                e
            )))
        })?
    }

    /// Insert a calendar, replacing any existing calendar with the same ID.
    ///
    /// # Errors
    /// Returns `CalendarError::Storage` on database failure.
    #[instrument(skip(self, calendar), fields(calendar_id = %calendar.calendar_id))]
    pub async fn put_calendar(&self, calendar: Calendar) -> Result<(), CalendarError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM calendar_jobs WHERE calendar_id = ?1",
                params![calendar.calendar_id],
            )?;
            tx.execute(
                "INSERT OR REPLACE INTO calendars (calendar_id, description) VALUES (?1, ?2)",
                params![calendar.calendar_id, calendar.description],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO calendar_jobs (calendar_id, job_id, position) VALUES (?1, ?2, ?3)",
                )?;
                for (position, job_id) in calendar.job_ids.iter().enumerate() {
                    stmt.execute(params![calendar.calendar_id, job_id, position as i64])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await?;

        tracing::debug!("Stored calendar");
        Ok(())
    }

    /// Delete a calendar. Returns `false` if it didn't exist.
    ///
    /// # Errors
    /// Returns `CalendarError::Storage` on database failure.
    #[instrument(skip(self))]
    pub async fn delete_calendar(&self, calendar_id: &str) -> Result<bool, CalendarError> {
        let calendar_id = calendar_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM calendar_jobs WHERE calendar_id = ?1",
                params![calendar_id],
            )?;
            let deleted = tx.execute(
                "DELETE FROM calendars WHERE calendar_id = ?1",
                params![calendar_id],
            )?;
            tx.commit()?;
            Ok(deleted > 0)
        })
        .await
    }

    fn load_job_ids(conn: &Connection, calendar_id: &str) -> Result<Vec<String>, CalendarError> {
        let mut stmt = conn.prepare_cached(
            "SELECT job_id FROM calendar_jobs WHERE calendar_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![calendar_id], |row| row.get(0))?;
        let job_ids = rows.collect::<Result<Vec<String>, _>>()?;
        Ok(job_ids)
    }
}

#[async_trait]
impl CalendarStore for SqliteCalendarStore {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_by_id(&self, calendar_id: &str) -> Result<Calendar, CalendarError> {
        let calendar_id = calendar_id.to_string();
        self.with_conn(move |conn| {
            let description: Option<Option<String>> = conn
                .query_row(
                    "SELECT description FROM calendars WHERE calendar_id = ?1",
                    params![calendar_id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(description) = description else {
                return Err(CalendarError::not_found(&calendar_id));
            };

            let job_ids = Self::load_job_ids(conn, &calendar_id)?;
            Ok(Calendar {
                calendar_id,
                job_ids,
                description,
            })
        })
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_by_query(
        &self,
        query: CalendarQuery,
    ) -> Result<QueryPage<Calendar>, CalendarError> {
        self.with_conn(move |conn| {
            // One read transaction so the count and the page see the same rows.
            let tx = conn.transaction()?;
            let page = query.get_page_params();
            let job_id = query.get_job_id().map(str::to_string);
            let order = if query.sort_ascending_by_id() { "ASC" } else { "DESC" };

            const FILTER: &str = "?1 IS NULL OR EXISTS (SELECT 1 FROM calendar_jobs j WHERE j.calendar_id = c.calendar_id AND j.job_id = ?1)";

            let count: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM calendars c WHERE {}", FILTER),
                params![job_id],
                |row| row.get(0),
            )?;

            let rows: Vec<(String, Option<String>)> = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT c.calendar_id, c.description FROM calendars c WHERE {} ORDER BY c.calendar_id {} LIMIT ?2 OFFSET ?3",
                    FILTER, order
                ))?;
                let mapped = stmt.query_map(
                    params![job_id, i64::from(page.size()), i64::from(page.from())],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                // Bound before returning so `mapped` releases `stmt` inside this block.
                let collected = mapped.collect::<Result<Vec<_>, _>>()?;
                collected
            };

            let mut calendars = Vec::with_capacity(rows.len());
            for (calendar_id, description) in rows {
                let job_ids = Self::load_job_ids(&tx, &calendar_id)?;
                calendars.push(Calendar {
                    calendar_id,
                    job_ids,
                    description,
                });
            }

            tx.commit()?;

            tracing::debug!(returned = calendars.len(), total = count, "Listed calendars");
            Ok(QueryPage::new(
                calendars,
                count.max(0) as u64,
                Calendar::RESULTS_FIELD,
            ))
        })
        .await
    }
}
