use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{
    certificate::Certificate,
    event::Event,
    ngo::Ngo,
    platform_settings::PlatformSettings,
    registration::EventRegistration,
    user::User,
    volunteer_profile::VolunteerProfile,
};
use crate::utils::form::FormData;

use super::event_dto::{EventSummary, RegistrationView};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_volunteers: i64,
    pub total_ngos: i64,
    pub approved_ngos: i64,
    pub pending_ngos: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    pub total_hours: i64,
    pub recent_volunteers: Vec<User>,
    pub recent_ngos: Vec<Ngo>,
    pub upcoming_events_list: Vec<Event>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminEventsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NgoApprovalsResponse {
    pub ngos: Vec<Ngo>,
    pub status_filter: String,
    pub pending_count: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NgoDetailResponse {
    pub ngo: Ngo,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NgoListResponse {
    pub ngos: Vec<Ngo>,
    pub search_query: String,
    pub total_ngos: usize,
    pub approved_ngos: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub volunteers: Vec<User>,
    pub search_query: String,
    pub total_volunteers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetailResponse {
    pub volunteer: User,
    pub profile: Option<VolunteerProfile>,
    pub registrations: Vec<EventRegistration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminEventListResponse {
    pub events: Vec<EventSummary>,
    pub search_query: String,
    pub status_filter: String,
    pub total_events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminEventDetailResponse {
    pub event: EventSummary,
    pub registrations: Vec<RegistrationView>,
    pub skills_list: Vec<String>,
    pub certificate: Option<Certificate>,
}

fn int_field(form: &FormData, name: &str, default: i32) -> Result<i32> {
    match form.text(name) {
        Some(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|_| Error::BadRequest(format!("{}: Enter a whole number.", name))),
        _ => Ok(default),
    }
}

/// Builds the settings posted by the admin form on top of `current`.
///
/// Every toggle follows checkbox semantics: absent means off. Numbers fall
/// back to their stock defaults when left out.
pub fn settings_from_form(form: &FormData, current: &PlatformSettings) -> Result<PlatformSettings> {
    let stock = PlatformSettings::default();
    Ok(PlatformSettings {
        id: current.id,
        site_name: form.text("site_name").unwrap_or(stock.site_name.as_str()).to_string(),
        site_tagline: form.text_or_default("site_tagline"),
        site_description: form.text_or_default("site_description"),

        admin_email: form.text_or_default("admin_email"),
        support_email: form.text_or_default("support_email"),
        noreply_email: form.text_or_default("noreply_email"),
        send_welcome_email: form.checkbox("send_welcome_email"),
        send_approval_emails: form.checkbox("send_approval_emails"),
        send_event_reminders: form.checkbox("send_event_reminders"),

        require_event_approval: form.checkbox("require_event_approval"),
        max_event_duration: int_field(form, "max_event_duration", stock.max_event_duration)?,
        min_volunteers_per_event: int_field(
            form,
            "min_volunteers_per_event",
            stock.min_volunteers_per_event,
        )?,
        max_volunteers_per_event: int_field(
            form,
            "max_volunteers_per_event",
            stock.max_volunteers_per_event,
        )?,
        event_cancellation_hours: int_field(
            form,
            "event_cancellation_hours",
            stock.event_cancellation_hours,
        )?,
        auto_complete_events: form.checkbox("auto_complete_events"),

        allow_volunteer_registration: form.checkbox("allow_volunteer_registration"),
        allow_ngo_registration: form.checkbox("allow_ngo_registration"),
        require_email_verification: form.checkbox("require_email_verification"),
        min_volunteer_age: int_field(form, "min_volunteer_age", stock.min_volunteer_age)?,

        require_ngo_verification: form.checkbox("require_ngo_verification"),
        auto_approve_verified_ngos: form.checkbox("auto_approve_verified_ngos"),
        ngo_approval_time: int_field(form, "ngo_approval_time", stock.ngo_approval_time)?,

        enable_push_notifications: form.checkbox("enable_push_notifications"),
        enable_sms_notifications: form.checkbox("enable_sms_notifications"),
        notify_on_new_event: form.checkbox("notify_on_new_event"),
        notify_on_event_update: form.checkbox("notify_on_event_update"),

        maintenance_mode: form.checkbox("maintenance_mode"),
        maintenance_message: form.text_or_default("maintenance_message"),

        updated_at: current.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_checkboxes_turn_toggles_off() {
        let current = PlatformSettings::default();
        assert!(current.send_welcome_email);

        let form = FormData::with_fields(&[("site_name", "Helpers"), ("maintenance_mode", "on")]);
        let updated = settings_from_form(&form, &current).unwrap();

        assert_eq!(updated.site_name, "Helpers");
        assert!(updated.maintenance_mode);
        assert!(!updated.send_welcome_email);
        assert!(!updated.allow_ngo_registration);
        assert_eq!(updated.max_volunteers_per_event, 100);
        assert_eq!(updated.maintenance_message, "");
    }

    #[test]
    fn numbers_are_parsed_or_refused() {
        let current = PlatformSettings::default();
        let form = FormData::with_fields(&[("min_volunteer_age", "16")]);
        assert_eq!(settings_from_form(&form, &current).unwrap().min_volunteer_age, 16);

        let bad = FormData::with_fields(&[("min_volunteer_age", "sixteen")]);
        assert!(settings_from_form(&bad, &current).is_err());
    }
}
