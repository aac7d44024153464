//! Calendar storage backend trait.
//!
//! `GetCalendars` only talks to storage through `CalendarStore`; the SQLite
//! implementation lives in `sqlite_store`, test doubles implement the same trait.

use async_trait::async_trait;

use crate::error::CalendarError;
use crate::page::QueryPage;
use crate::query::CalendarQuery;
use crate::types::Calendar;

/// Read access to persisted calendars.
///
/// Implementations must be safe for concurrent reads; one store instance is
/// shared by every in-flight request.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Get a calendar by ID.
    ///
    /// # Errors
    /// Returns `CalendarError::NotFound` if no calendar has this ID, or a
    /// storage/timeout error if the backend fails.
    async fn fetch_by_id(&self, calendar_id: &str) -> Result<Calendar, CalendarError>;

    /// List one page of calendars.
    ///
    /// The store applies the query's window, sort order and filters, and reports
    /// the total number of matching calendars as the page count.
    ///
    /// # Errors
    /// Returns a storage/timeout error if the backend fails.
    async fn list_by_query(&self, query: CalendarQuery)
        -> Result<QueryPage<Calendar>, CalendarError>;
}
