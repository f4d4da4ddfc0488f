use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::{
    certificate::CertificateStatus,
    event::{Capacity, Event, EventStatus},
    registration::EventRegistration,
    user::User,
    volunteer_profile::VolunteerProfile,
};
use crate::utils::form::FormData;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

/// Text fields of the event create/edit form; files are handled separately.
#[derive(Debug, Clone, Validate)]
pub struct EventForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    pub required_skills: String,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub max_volunteers: i32,
    pub status: EventStatus,
}

impl EventForm {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let date = parse_event_date(form.text("date").unwrap_or_default())?;
        let max_volunteers = form
            .text("max_volunteers")
            .unwrap_or_default()
            .parse::<i32>()
            .map_err(|_| Error::BadRequest("max_volunteers: Enter a whole number.".into()))?;
        let status = match form.text("status") {
            Some(raw) if !raw.is_empty() => raw.parse()?,
            _ => EventStatus::default(),
        };

        let parsed = Self {
            title: form.text_or_default("title"),
            description: form.text_or_default("description"),
            date,
            location: form.text_or_default("location"),
            required_skills: form.text_or_default("required_skills"),
            max_volunteers,
            status,
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

/// Accepts RFC 3339 or the `datetime-local` input format (read as UTC).
fn parse_event_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::BadRequest("date: Enter a valid date/time.".into()))
}

/// An event with the derived values shown in every listing.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    pub organization_name: String,
    pub registered_count: i64,
    pub pending_count: i64,
    pub available_spots: i64,
    pub is_full: bool,
    pub is_past: bool,
    pub certificate_status: Option<CertificateStatus>,
}

impl EventSummary {
    pub fn new(
        event: Event,
        organization_name: String,
        capacity: Capacity,
        pending_count: i64,
        certificate_status: Option<CertificateStatus>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            is_past: event.is_past(now),
            event,
            organization_name,
            registered_count: capacity.approved,
            pending_count,
            available_spots: capacity.available_spots(),
            is_full: capacity.is_full(),
            certificate_status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventSummary>,
    pub search_query: String,
    pub status_filter: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetailResponse {
    pub event: EventSummary,
    pub skills_list: Vec<String>,
    pub user_registration: Option<EventRegistration>,
    pub approved_volunteers: Vec<User>,
}

/// A registration together with the applying volunteer.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationView {
    pub registration: EventRegistration,
    pub volunteer: User,
    pub profile: Option<VolunteerProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManageRegistrationsResponse {
    pub event: EventSummary,
    pub registrations: Vec<RegistrationView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MyEventEntry {
    pub registration: EventRegistration,
    pub event: Event,
    pub organization_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NgoEventsResponse {
    pub organization_name: String,
    pub events: Vec<EventSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn datetime_local_and_rfc3339_are_accepted() {
        let local = parse_event_date("2030-05-01T09:30").unwrap();
        assert_eq!((local.year(), local.hour(), local.minute()), (2030, 9, 30));
        let rfc = parse_event_date("2030-05-01T09:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 7);
        assert!(parse_event_date("next tuesday").is_err());
    }

    #[test]
    fn form_requires_positive_capacity() {
        let form = FormData::with_fields(&[
            ("title", "Cleanup"),
            ("description", "Beach"),
            ("date", "2030-05-01T09:30"),
            ("location", "Shore"),
            ("max_volunteers", "0"),
        ]);
        assert!(matches!(EventForm::from_form(&form), Err(Error::Validation(_))));
    }

    #[test]
    fn form_defaults_status_to_published() {
        let form = FormData::with_fields(&[
            ("title", "Cleanup"),
            ("description", "Beach"),
            ("date", "2030-05-01T09:30"),
            ("location", "Shore"),
            ("max_volunteers", "4"),
        ]);
        let parsed = EventForm::from_form(&form).unwrap();
        assert_eq!(parsed.status, EventStatus::Published);
        assert_eq!(parsed.max_volunteers, 4);
    }
}
