//! Listing query handed to a [`CalendarStore`](crate::store::CalendarStore).

use crate::page::PageParams;

/// Describes which window of calendars to list and in what order.
///
/// Built fluently:
/// ```
/// use calhub_calendar::{CalendarQuery, PageParams};
///
/// let query = CalendarQuery::new()
///     .page_params(PageParams::default_params())
///     .sort(true);
/// assert!(query.sort_ascending_by_id());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CalendarQuery {
    page_params: PageParams,
    sort_ascending_by_id: bool,
    job_id: Option<String>,
}

impl CalendarQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_params(mut self, page_params: PageParams) -> Self {
        self.page_params = page_params;
        self
    }

    /// `true` sorts ascending by calendar id, `false` descending.
    pub fn sort(mut self, ascending: bool) -> Self {
        self.sort_ascending_by_id = ascending;
        self
    }

    /// Only match calendars that apply to `job_id`.
    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn get_page_params(&self) -> PageParams {
        self.page_params
    }

    pub fn sort_ascending_by_id(&self) -> bool {
        self.sort_ascending_by_id
    }

    pub fn get_job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }
}
