use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Primary key of the only settings row.
pub const SETTINGS_ID: i32 = 1;

pub const DEFAULT_MAINTENANCE_MESSAGE: &str =
    "We are currently performing maintenance. Please check back soon.";

/// Platform-wide configuration. Exactly one row exists once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlatformSettings {
    pub id: i32,

    pub site_name: String,
    pub site_tagline: String,
    pub site_description: String,

    pub admin_email: String,
    pub support_email: String,
    pub noreply_email: String,
    pub send_welcome_email: bool,
    pub send_approval_emails: bool,
    pub send_event_reminders: bool,

    pub require_event_approval: bool,
    /// Days.
    pub max_event_duration: i32,
    pub min_volunteers_per_event: i32,
    pub max_volunteers_per_event: i32,
    /// Minimum hours of notice for cancellation.
    pub event_cancellation_hours: i32,
    pub auto_complete_events: bool,

    pub allow_volunteer_registration: bool,
    pub allow_ngo_registration: bool,
    pub require_email_verification: bool,
    pub min_volunteer_age: i32,

    pub require_ngo_verification: bool,
    pub auto_approve_verified_ngos: bool,
    /// Review time in days.
    pub ngo_approval_time: i32,

    pub enable_push_notifications: bool,
    pub enable_sms_notifications: bool,
    pub notify_on_new_event: bool,
    pub notify_on_event_update: bool,

    pub maintenance_mode: bool,
    pub maintenance_message: String,

    pub updated_at: DateTime<Utc>,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID,
            site_name: "Voluntree".to_string(),
            site_tagline: String::new(),
            site_description: String::new(),
            admin_email: String::new(),
            support_email: String::new(),
            noreply_email: String::new(),
            send_welcome_email: true,
            send_approval_emails: true,
            send_event_reminders: true,
            require_event_approval: false,
            max_event_duration: 30,
            min_volunteers_per_event: 1,
            max_volunteers_per_event: 100,
            event_cancellation_hours: 24,
            auto_complete_events: true,
            allow_volunteer_registration: true,
            allow_ngo_registration: true,
            require_email_verification: false,
            min_volunteer_age: 13,
            require_ngo_verification: true,
            auto_approve_verified_ngos: false,
            ngo_approval_time: 3,
            enable_push_notifications: false,
            enable_sms_notifications: false,
            notify_on_new_event: true,
            notify_on_event_update: true,
            maintenance_mode: false,
            maintenance_message: DEFAULT_MAINTENANCE_MESSAGE.to_string(),
            updated_at: Utc::now(),
        }
    }
}
