//! The "get calendars" operation: one calendar by ID, or a page of calendars.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::instrument;

use crate::error::{CalendarError, ValidationErrors};
use crate::page::{PageParams, QueryPage};
use crate::query::CalendarQuery;
use crate::store::CalendarStore;
use crate::types::Calendar;

/// Get-calendars request.
///
/// `calendar_id` and `page_params` are mutually exclusive; `validate` rejects
/// a request carrying both. A request carrying neither lists calendars with
/// the default page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calendar_id: Option<String>,
    #[serde(default, rename = "page", skip_serializing_if = "Option::is_none")]
    page_params: Option<PageParams>,
}

/// What a validated request asks for.
enum Target<'a> {
    ById(&'a str),
    Page(PageParams),
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: Some(calendar_id.into()),
            page_params: None,
        }
    }

    pub fn page(page_params: PageParams) -> Self {
        Self {
            calendar_id: None,
            page_params: Some(page_params),
        }
    }

    pub fn set_calendar_id(&mut self, calendar_id: impl Into<String>) {
        self.calendar_id = Some(calendar_id.into());
    }

    pub fn set_page_params(&mut self, page_params: PageParams) {
        self.page_params = Some(page_params);
    }

    pub fn calendar_id(&self) -> Option<&str> {
        self.calendar_id.as_deref()
    }

    pub fn page_params(&self) -> Option<PageParams> {
        self.page_params
    }

    /// Check the request shape.
    ///
    /// # Errors
    /// Returns `CalendarError::Validation` if both an ID and page params are set.
    pub fn validate(&self) -> Result<(), CalendarError> {
        let mut errors = ValidationErrors::new();

        if self.calendar_id.is_some() && self.page_params.is_some() {
            errors.add(format!(
                "Params [{}, {}] are incompatible with [{}].",
                PageParams::FROM,
                PageParams::SIZE,
                Calendar::ID
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CalendarError::Validation(errors))
        }
    }

    fn target(&self) -> Result<Target<'_>, CalendarError> {
        self.validate()?;
        Ok(match (&self.calendar_id, self.page_params) {
            (Some(calendar_id), _) => Target::ById(calendar_id),
            (None, page_params) => Target::Page(page_params.unwrap_or_default()),
        })
    }
}

/// Get-calendars response: one page of calendars.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Response {
    calendars: QueryPage<Calendar>,
}

impl Response {
    pub fn new(calendars: QueryPage<Calendar>) -> Self {
        Self { calendars }
    }

    pub fn calendars(&self) -> &QueryPage<Calendar> {
        &self.calendars
    }

    pub fn into_calendars(self) -> QueryPage<Calendar> {
        self.calendars
    }
}

/// Serializes as the page body: `{"count": n, "calendars": [...]}`.
impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.calendars.serialize(serializer)
    }
}

#[derive(Deserialize)]
struct ResponseBody {
    count: u64,
    calendars: Vec<Calendar>,
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = ResponseBody::deserialize(deserializer)?;
        Ok(Self::new(QueryPage::new(
            body.calendars,
            body.count,
            Calendar::RESULTS_FIELD,
        )))
    }
}

/// Dispatches get-calendars requests to a [`CalendarStore`].
///
/// Holds no per-request state; clone it or share it behind an `Arc` across
/// concurrent requests.
#[derive(Clone)]
pub struct GetCalendars {
    store: Arc<dyn CalendarStore>,
}

impl GetCalendars {
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    /// Handle one request.
    ///
    /// Validation happens before any store call. Store failures are returned
    /// exactly as the store reported them.
    ///
    /// # Errors
    /// Returns `CalendarError::Validation` for a malformed request, otherwise
    /// whatever error the store returned.
    #[instrument(skip(self), level = "info")]
    pub async fn handle(&self, request: Request) -> Result<Response, CalendarError> {
        match request.target() {
            Ok(Target::ById(calendar_id)) => self.get_calendar(calendar_id).await,
            Ok(Target::Page(page_params)) => self.get_calendars(page_params).await,
            Err(e) => {
                tracing::debug!("Rejected request: {}", e);
                Err(e)
            }
        }
    }

    async fn get_calendar(&self, calendar_id: &str) -> Result<Response, CalendarError> {
        let calendar = self.store.fetch_by_id(calendar_id).await?;
        Ok(Response::new(QueryPage::single(
            calendar,
            Calendar::RESULTS_FIELD,
        )))
    }

    async fn get_calendars(&self, page_params: PageParams) -> Result<Response, CalendarError> {
        let query = CalendarQuery::new().page_params(page_params).sort(true);
        let calendars = self.store.list_by_query(query).await?;
        tracing::debug!(
            returned = calendars.results().len(),
            total = calendars.count(),
            "Listed calendars"
        );
        Ok(Response::new(calendars))
    }
}
