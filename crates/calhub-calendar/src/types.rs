//! Calendar entity.

use serde::{Deserialize, Serialize};

/// A named set of scheduled events that applies to one or more jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Calendar {
    pub calendar_id: String,
    #[serde(default)]
    pub job_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Calendar {
    /// Field name of the calendar identifier.
    pub const ID: &'static str = "calendar_id";

    /// Key under which a collection of calendars is grouped.
    pub const RESULTS_FIELD: &'static str = "calendars";

    pub fn new(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            job_ids: Vec::new(),
            description: None,
        }
    }

    pub fn with_job_ids<I, S>(mut self, job_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job_ids = job_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.calendar_id
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_calendar_from_json() {
        let json = r#"{
            "calendar_id": "holidays",
            "job_ids": ["web-traffic", "checkout-latency"],
            "description": "Public holidays"
        }"#;

        let calendar: Calendar = serde_json::from_str(json).unwrap();

        assert_eq!(calendar.id(), "holidays");
        assert_eq!(calendar.job_ids.len(), 2);
        assert_eq!(calendar.description.as_deref(), Some("Public holidays"));
    }

    #[test]
    fn test_calendar_minimal_json() {
        let calendar: Calendar = serde_json::from_str(r#"{"calendar_id": "maint"}"#).unwrap();
        assert_eq!(calendar, Calendar::new("maint"));

        let out = serde_json::to_value(&calendar).unwrap();
        assert!(out.get("description").is_none());
    }
}
