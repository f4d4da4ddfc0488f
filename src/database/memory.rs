//! In-process store backed by hash maps behind a single lock.
//!
//! Used by the test-suite and by `DATABASE_URL=memory://` for local runs.
//! Cascades mirror the `ON DELETE CASCADE` rules of the Postgres schema.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{
    CertificateFilter, CertificateRepository, EventFilter, EventOrder, EventRepository, NgoFilter,
    NgoRepository, RegistrationFilter, RegistrationRepository, SettingsRepository, UserFilter,
    UserRepository,
};
use crate::error::{Error, Result};
use crate::models::{
    certificate::{Certificate, CertificateAssignment, CertificateStatus},
    event::Event,
    ngo::{Ngo, NgoStatus},
    platform_settings::{PlatformSettings, SETTINGS_ID},
    registration::{ApprovalOutcome, EventRegistration, RegistrationStatus},
    user::{User, UserRole},
    volunteer_profile::VolunteerProfile,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    /// Keyed by user id.
    volunteer_profiles: HashMap<Uuid, VolunteerProfile>,
    ngos: HashMap<Uuid, Ngo>,
    events: HashMap<Uuid, Event>,
    registrations: HashMap<Uuid, EventRegistration>,
    certificates: HashMap<Uuid, Certificate>,
    assignments: HashMap<Uuid, CertificateAssignment>,
    settings: Option<PlatformSettings>,
}

impl State {
    fn check_new_user(&self, user: &User) -> Result<()> {
        if self.users.values().any(|u| u.username == user.username) {
            return Err(Error::Conflict("Duplicate value violates users_username_key".into()));
        }
        if self.users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict("Duplicate value violates users_email_key".into()));
        }
        Ok(())
    }

    fn remove_certificate(&mut self, id: Uuid) -> bool {
        self.assignments.retain(|_, a| a.certificate_id != id);
        self.certificates.remove(&id).is_some()
    }

    fn remove_event(&mut self, id: Uuid) -> bool {
        self.registrations.retain(|_, r| r.event_id != id);
        let certificate_ids: Vec<Uuid> = self
            .certificates
            .values()
            .filter(|c| c.event_id == id)
            .map(|c| c.id)
            .collect();
        for certificate_id in certificate_ids {
            self.remove_certificate(certificate_id);
        }
        self.events.remove(&id).is_some()
    }

    fn remove_user(&mut self, id: Uuid) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        self.volunteer_profiles.remove(&id);
        self.registrations.retain(|_, r| r.volunteer_id != id);
        self.assignments.retain(|_, a| a.volunteer_id != id);

        let ngo_ids: Vec<Uuid> = self
            .ngos
            .values()
            .filter(|n| n.user_id == id)
            .map(|n| n.id)
            .collect();
        for ngo_id in ngo_ids {
            let event_ids: Vec<Uuid> = self
                .events
                .values()
                .filter(|e| e.ngo_id == ngo_id)
                .map(|e| e.id)
                .collect();
            for event_id in event_ids {
                self.remove_event(event_id);
            }
            self.ngos.remove(&ngo_id);
        }
        true
    }

    fn event_matches(&self, event: &Event, filter: &EventFilter) -> bool {
        if filter.ngo_id.is_some_and(|id| event.ngo_id != id) {
            return false;
        }
        if filter.status.is_some_and(|s| event.status != s) {
            return false;
        }
        if filter.starting_from.is_some_and(|from| event.date < from) {
            return false;
        }
        if let Some(term) = filter.search.as_deref() {
            if !(contains_ci(&event.title, term)
                || contains_ci(&event.description, term)
                || contains_ci(&event.location, term))
            {
                return false;
            }
        }
        if let Some(term) = filter.search_with_organization.as_deref() {
            let organization = self
                .ngos
                .get(&event.ngo_id)
                .map(|n| n.organization_name.as_str())
                .unwrap_or_default();
            if !(contains_ci(&event.title, term) || contains_ci(organization, term)) {
                return false;
            }
        }
        true
    }

    fn approved_count(&self, event_id: Uuid) -> i64 {
        self.registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Approved)
            .count() as i64
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored settings rows; never more than one.
    pub async fn settings_row_count(&self) -> usize {
        usize::from(self.state.read().await.settings.is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_new_user(user)?;
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_volunteer_account(
        &self,
        user: &User,
        profile: &VolunteerProfile,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_new_user(user)?;
        state.users.insert(user.id, user.clone());
        state.volunteer_profiles.insert(user.id, profile.clone());
        Ok(())
    }

    async fn insert_ngo_account(&self, user: &User, ngo: &Ngo) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_new_user(user)?;
        if state
            .ngos
            .values()
            .any(|n| n.registration_number == ngo.registration_number)
        {
            return Err(Error::Conflict(
                "Duplicate value violates ngos_registration_number_key".into(),
            ));
        }
        state.users.insert(user.id, user.clone());
        state.ngos.insert(ngo.id, ngo.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(Error::Conflict("Duplicate value violates users_email_key".into()));
        }
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(Error::NotFound("User not found".into())),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.remove_user(id))
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .filter(|u| match filter.search.as_deref() {
                Some(term) => {
                    contains_ci(&u.username, term)
                        || contains_ci(&u.email, term)
                        || contains_ci(&u.first_name, term)
                        || contains_ci(&u.last_name, term)
                }
                None => true,
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));
        Ok(users)
    }

    async fn count_users(&self, role: Option<UserRole>) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .count() as i64)
    }

    async fn find_volunteer_profile(&self, user_id: Uuid) -> Result<Option<VolunteerProfile>> {
        Ok(self.state.read().await.volunteer_profiles.get(&user_id).cloned())
    }

    async fn update_volunteer_profile(&self, profile: &VolunteerProfile) -> Result<()> {
        let mut state = self.state.write().await;
        match state.volunteer_profiles.get_mut(&profile.user_id) {
            Some(existing) => {
                *existing = profile.clone();
                Ok(())
            }
            None => Err(Error::NotFound("Volunteer profile not found".into())),
        }
    }

    async fn total_volunteer_hours(&self) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .volunteer_profiles
            .values()
            .map(|p| p.hours_completed as i64)
            .sum())
    }
}

#[async_trait]
impl NgoRepository for MemoryStore {
    async fn find_ngo(&self, id: Uuid) -> Result<Option<Ngo>> {
        Ok(self.state.read().await.ngos.get(&id).cloned())
    }

    async fn find_ngo_by_user(&self, user_id: Uuid) -> Result<Option<Ngo>> {
        let state = self.state.read().await;
        Ok(state.ngos.values().find(|n| n.user_id == user_id).cloned())
    }

    async fn find_ngo_by_registration_number(&self, number: &str) -> Result<Option<Ngo>> {
        let state = self.state.read().await;
        Ok(state
            .ngos
            .values()
            .find(|n| n.registration_number == number)
            .cloned())
    }

    async fn update_ngo(&self, ngo: &Ngo) -> Result<()> {
        let mut state = self.state.write().await;
        match state.ngos.get_mut(&ngo.id) {
            Some(existing) => {
                *existing = ngo.clone();
                Ok(())
            }
            None => Err(Error::NotFound("NGO not found".into())),
        }
    }

    async fn list_ngos(&self, filter: &NgoFilter) -> Result<Vec<Ngo>> {
        let state = self.state.read().await;
        let mut ngos: Vec<Ngo> = state
            .ngos
            .values()
            .filter(|n| filter.status.map_or(true, |s| n.status == s))
            .filter(|n| match filter.search.as_deref() {
                Some(term) => {
                    contains_ci(&n.organization_name, term)
                        || contains_ci(&n.email, term)
                        || contains_ci(&n.registration_number, term)
                }
                None => true,
            })
            .cloned()
            .collect();
        ngos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ngos)
    }

    async fn count_ngos(&self, status: Option<NgoStatus>) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .ngos
            .values()
            .filter(|n| status.map_or(true, |s| n.status == s))
            .count() as i64)
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.ngos.contains_key(&event.ngo_id) {
            return Err(Error::NotFound("NGO not found".into()));
        }
        state.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        Ok(self.state.read().await.events.get(&id).cloned())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut state = self.state.write().await;
        match state.events.get_mut(&event.id) {
            Some(existing) => {
                *existing = event.clone();
                Ok(())
            }
            None => Err(Error::NotFound("Event not found".into())),
        }
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.remove_event(id))
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| state.event_matches(e, filter))
            .cloned()
            .collect();
        match filter.order {
            EventOrder::NewestFirst => events.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            EventOrder::SoonestFirst => events.sort_by(|a, b| a.date.cmp(&b.date)),
        }
        if let Some(limit) = filter.limit {
            events.truncate(limit.max(0) as usize);
        }
        Ok(events)
    }

    async fn count_events(&self, filter: &EventFilter) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .events
            .values()
            .filter(|e| state.event_matches(e, filter))
            .count() as i64)
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn insert_registration(&self, registration: &EventRegistration) -> Result<()> {
        let mut state = self.state.write().await;
        if state.registrations.values().any(|r| {
            r.event_id == registration.event_id && r.volunteer_id == registration.volunteer_id
        }) {
            return Err(Error::Conflict(
                "Duplicate value violates event_registrations_event_volunteer_key".into(),
            ));
        }
        state.registrations.insert(registration.id, registration.clone());
        Ok(())
    }

    async fn find_registration(&self, id: Uuid) -> Result<Option<EventRegistration>> {
        Ok(self.state.read().await.registrations.get(&id).cloned())
    }

    async fn find_registration_for(
        &self,
        event_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Option<EventRegistration>> {
        let state = self.state.read().await;
        Ok(state
            .registrations
            .values()
            .find(|r| r.event_id == event_id && r.volunteer_id == volunteer_id)
            .cloned())
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<EventRegistration>> {
        let state = self.state.read().await;
        let mut registrations: Vec<EventRegistration> = state
            .registrations
            .values()
            .filter(|r| filter.event_id.map_or(true, |id| r.event_id == id))
            .filter(|r| filter.volunteer_id.map_or(true, |id| r.volunteer_id == id))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| !(filter.exclude_withdrawn && r.status == RegistrationStatus::Withdrawn))
            .cloned()
            .collect();
        registrations.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(registrations)
    }

    async fn count_registrations(
        &self,
        event_id: Uuid,
        status: RegistrationStatus,
    ) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == status)
            .count() as i64)
    }

    async fn set_registration_status(&self, id: Uuid, status: RegistrationStatus) -> Result<()> {
        let mut state = self.state.write().await;
        match state.registrations.get_mut(&id) {
            Some(registration) => {
                registration.status = status;
                registration.updated_at = Utc::now();
                Ok(())
            }
            None => Err(Error::NotFound("Registration not found".into())),
        }
    }

    async fn approve_registration(&self, id: Uuid) -> Result<ApprovalOutcome> {
        let mut state = self.state.write().await;
        let (event_id, status) = state
            .registrations
            .get(&id)
            .map(|r| (r.event_id, r.status))
            .ok_or_else(|| Error::NotFound("Registration not found".into()))?;
        if status != RegistrationStatus::Pending {
            return Ok(ApprovalOutcome::NotPending(status));
        }
        let max_volunteers = state
            .events
            .get(&event_id)
            .map(|e| e.max_volunteers as i64)
            .ok_or_else(|| Error::NotFound("Event not found".into()))?;

        if state.approved_count(event_id) >= max_volunteers {
            return Ok(ApprovalOutcome::EventFull);
        }

        if let Some(registration) = state.registrations.get_mut(&id) {
            registration.status = RegistrationStatus::Approved;
            registration.updated_at = Utc::now();
        }
        Ok(ApprovalOutcome::Approved)
    }
}

#[async_trait]
impl CertificateRepository for MemoryStore {
    async fn find_certificate(&self, id: Uuid) -> Result<Option<Certificate>> {
        Ok(self.state.read().await.certificates.get(&id).cloned())
    }

    async fn find_certificate_for_event(&self, event_id: Uuid) -> Result<Option<Certificate>> {
        let state = self.state.read().await;
        Ok(state
            .certificates
            .values()
            .find(|c| c.event_id == event_id)
            .cloned())
    }

    async fn replace_certificate(&self, certificate: &Certificate) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.events.contains_key(&certificate.event_id) {
            return Err(Error::NotFound("Event not found".into()));
        }
        let previous: Vec<Uuid> = state
            .certificates
            .values()
            .filter(|c| c.event_id == certificate.event_id)
            .map(|c| c.id)
            .collect();
        for id in previous {
            state.remove_certificate(id);
        }
        state.certificates.insert(certificate.id, certificate.clone());
        Ok(())
    }

    async fn update_certificate(&self, certificate: &Certificate) -> Result<()> {
        let mut state = self.state.write().await;
        match state.certificates.get_mut(&certificate.id) {
            Some(existing) => {
                *existing = certificate.clone();
                Ok(())
            }
            None => Err(Error::NotFound("Certificate not found".into())),
        }
    }

    async fn delete_certificate(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.remove_certificate(id))
    }

    async fn list_certificates(&self, filter: &CertificateFilter) -> Result<Vec<Certificate>> {
        let state = self.state.read().await;
        let mut certificates: Vec<Certificate> = state
            .certificates
            .values()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| match filter.search.as_deref() {
                Some(term) => {
                    let event = state.events.get(&c.event_id);
                    let title = event.map(|e| e.title.as_str()).unwrap_or_default();
                    let organization = event
                        .and_then(|e| state.ngos.get(&e.ngo_id))
                        .map(|n| n.organization_name.as_str())
                        .unwrap_or_default();
                    contains_ci(title, term) || contains_ci(organization, term)
                }
                None => true,
            })
            .cloned()
            .collect();
        if filter.oldest_first {
            certificates.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
        } else {
            certificates.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        }
        Ok(certificates)
    }

    async fn count_certificates(&self, status: Option<CertificateStatus>) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .certificates
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .count() as i64)
    }

    async fn insert_assignment(&self, assignment: &CertificateAssignment) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.certificates.contains_key(&assignment.certificate_id) {
            return Err(Error::NotFound("Certificate not found".into()));
        }
        if state.assignments.values().any(|a| {
            a.certificate_id == assignment.certificate_id
                && a.volunteer_id == assignment.volunteer_id
        }) {
            return Err(Error::Conflict(
                "Duplicate value violates certificate_assignments_certificate_volunteer_key".into(),
            ));
        }
        state.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn list_assignments_for_certificate(
        &self,
        certificate_id: Uuid,
    ) -> Result<Vec<CertificateAssignment>> {
        let state = self.state.read().await;
        let mut assignments: Vec<CertificateAssignment> = state
            .assignments
            .values()
            .filter(|a| a.certificate_id == certificate_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        Ok(assignments)
    }

    async fn list_assignments_for_volunteer(
        &self,
        volunteer_id: Uuid,
    ) -> Result<Vec<CertificateAssignment>> {
        let state = self.state.read().await;
        let mut assignments: Vec<CertificateAssignment> = state
            .assignments
            .values()
            .filter(|a| a.volunteer_id == volunteer_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        Ok(assignments)
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn load_settings(&self) -> Result<PlatformSettings> {
        let mut state = self.state.write().await;
        Ok(state
            .settings
            .get_or_insert_with(PlatformSettings::default)
            .clone())
    }

    async fn save_settings(&self, settings: &PlatformSettings) -> Result<PlatformSettings> {
        let mut stored = settings.clone();
        stored.id = SETTINGS_ID;
        stored.updated_at = Utc::now();
        self.state.write().await.settings = Some(stored.clone());
        Ok(stored)
    }
}
