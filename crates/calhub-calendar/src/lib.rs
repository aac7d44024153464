//! Calendar retrieval for calhub.
//!
//! Provides the get-calendars operation, its paging types, the storage trait
//! it runs against, and a SQLite store.

pub mod action;
pub mod error;
pub mod page;
pub mod query;
pub mod sqlite_store;
pub mod store;
pub mod types;

pub use action::{GetCalendars, Request, Response};
pub use error::{CalendarError, ValidationErrors};
pub use page::{PageParams, QueryPage};
pub use query::CalendarQuery;
pub use sqlite_store::SqliteCalendarStore;
pub use store::CalendarStore;
pub use types::Calendar;
