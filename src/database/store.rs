//! Repository interface shared by the Postgres and in-memory stores.
//!
//! Services only ever talk to `dyn Store`; each trait groups the persistence
//! operations of one aggregate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    certificate::{Certificate, CertificateAssignment, CertificateStatus},
    event::{Event, EventStatus},
    ngo::{Ngo, NgoStatus},
    platform_settings::PlatformSettings,
    registration::{ApprovalOutcome, EventRegistration, RegistrationStatus},
    user::{User, UserRole},
    volunteer_profile::VolunteerProfile,
};

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Case-insensitive match on username, email, first or last name.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NgoFilter {
    pub status: Option<NgoStatus>,
    /// Case-insensitive match on organization name, email or registration number.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventOrder {
    #[default]
    NewestFirst,
    SoonestFirst,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub ngo_id: Option<Uuid>,
    pub status: Option<EventStatus>,
    /// Only events dated at or after this instant.
    pub starting_from: Option<DateTime<Utc>>,
    /// Matches title, description or location.
    pub search: Option<String>,
    /// Matches title or the owning organization's name.
    pub search_with_organization: Option<String>,
    pub order: EventOrder,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub event_id: Option<Uuid>,
    pub volunteer_id: Option<Uuid>,
    pub status: Option<RegistrationStatus>,
    pub exclude_withdrawn: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CertificateFilter {
    pub status: Option<CertificateStatus>,
    /// Matches the event title or the organization name.
    pub search: Option<String>,
    pub oldest_first: bool,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<()>;
    /// Creates a volunteer account and its profile together.
    async fn insert_volunteer_account(&self, user: &User, profile: &VolunteerProfile)
        -> Result<()>;
    /// Creates an NGO account and its organization record together.
    async fn insert_ngo_account(&self, user: &User, ngo: &Ngo) -> Result<()>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_user(&self, user: &User) -> Result<()>;
    /// Removes the user and everything hanging off it.
    async fn delete_user(&self, id: Uuid) -> Result<bool>;
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>>;
    async fn count_users(&self, role: Option<UserRole>) -> Result<i64>;

    async fn find_volunteer_profile(&self, user_id: Uuid) -> Result<Option<VolunteerProfile>>;
    async fn update_volunteer_profile(&self, profile: &VolunteerProfile) -> Result<()>;
    async fn total_volunteer_hours(&self) -> Result<i64>;
}

#[async_trait]
pub trait NgoRepository: Send + Sync {
    async fn find_ngo(&self, id: Uuid) -> Result<Option<Ngo>>;
    async fn find_ngo_by_user(&self, user_id: Uuid) -> Result<Option<Ngo>>;
    async fn find_ngo_by_registration_number(&self, number: &str) -> Result<Option<Ngo>>;
    async fn update_ngo(&self, ngo: &Ngo) -> Result<()>;
    /// Newest first.
    async fn list_ngos(&self, filter: &NgoFilter) -> Result<Vec<Ngo>>;
    async fn count_ngos(&self, status: Option<NgoStatus>) -> Result<i64>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert_event(&self, event: &Event) -> Result<()>;
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>>;
    async fn update_event(&self, event: &Event) -> Result<()>;
    /// Removes the event with its registrations, certificate and assignments.
    async fn delete_event(&self, id: Uuid) -> Result<bool>;
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;
    async fn count_events(&self, filter: &EventFilter) -> Result<i64>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Fails with `Error::Conflict` when the pair already exists.
    async fn insert_registration(&self, registration: &EventRegistration) -> Result<()>;
    async fn find_registration(&self, id: Uuid) -> Result<Option<EventRegistration>>;
    async fn find_registration_for(
        &self,
        event_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Option<EventRegistration>>;
    /// Newest application first.
    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<EventRegistration>>;
    async fn count_registrations(&self, event_id: Uuid, status: RegistrationStatus)
        -> Result<i64>;
    async fn set_registration_status(&self, id: Uuid, status: RegistrationStatus) -> Result<()>;
    /// Counts the event's approved seats and approves the registration in one
    /// atomic step; leaves the row untouched when the event is full.
    async fn approve_registration(&self, id: Uuid) -> Result<ApprovalOutcome>;
}

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn find_certificate(&self, id: Uuid) -> Result<Option<Certificate>>;
    async fn find_certificate_for_event(&self, event_id: Uuid) -> Result<Option<Certificate>>;
    /// Drops any certificate the event already has (with its assignments) and
    /// stores the new one.
    async fn replace_certificate(&self, certificate: &Certificate) -> Result<()>;
    async fn update_certificate(&self, certificate: &Certificate) -> Result<()>;
    async fn delete_certificate(&self, id: Uuid) -> Result<bool>;
    async fn list_certificates(&self, filter: &CertificateFilter) -> Result<Vec<Certificate>>;
    async fn count_certificates(&self, status: Option<CertificateStatus>) -> Result<i64>;

    /// Fails with `Error::Conflict` when the volunteer already holds it.
    async fn insert_assignment(&self, assignment: &CertificateAssignment) -> Result<()>;
    async fn list_assignments_for_certificate(
        &self,
        certificate_id: Uuid,
    ) -> Result<Vec<CertificateAssignment>>;
    /// Newest first.
    async fn list_assignments_for_volunteer(
        &self,
        volunteer_id: Uuid,
    ) -> Result<Vec<CertificateAssignment>>;
}

/// Persistence for the settings singleton. Rows are never deleted.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns the stored row, creating the default one when absent.
    async fn load_settings(&self) -> Result<PlatformSettings>;
    /// Upserts under the singleton id whatever id the value carries.
    async fn save_settings(&self, settings: &PlatformSettings) -> Result<PlatformSettings>;
}

pub trait Store:
    UserRepository
    + NgoRepository
    + EventRepository
    + RegistrationRepository
    + CertificateRepository
    + SettingsRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + NgoRepository
        + EventRepository
        + RegistrationRepository
        + CertificateRepository
        + SettingsRepository
{
}
