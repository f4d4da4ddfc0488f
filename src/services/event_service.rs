use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::store::{EventFilter, RegistrationFilter, Store};
use crate::dto::admin_dto::{AdminEventDetailResponse, AdminEventListResponse, AdminEventsQuery};
use crate::dto::event_dto::{
    EventDetailResponse, EventForm, EventListQuery, EventListResponse, EventSummary,
    NgoEventsResponse, RegistrationView,
};
use crate::error::{Error, Result};
use crate::models::{
    certificate::Certificate,
    event::{Event, EventStatus},
    ngo::Ngo,
    registration::RegistrationStatus,
    user::{User, UserRole},
};
use crate::services::storage_service::{FileStorage, UploadKind};
use crate::utils::form::UploadedFile;

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub(crate) async fn find_event(store: &dyn Store, event_id: Uuid) -> Result<Event> {
    store
        .find_event(event_id)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".into()))
}

pub(crate) async fn ngo_for_user(store: &dyn Store, user: &User) -> Result<Ngo> {
    store
        .find_ngo_by_user(user.id)
        .await?
        .ok_or_else(|| Error::NotFound("NGO profile not found".into()))
}

/// Loads an event the calling organization owns.
///
/// Non-NGO callers get "Access denied." and other organizations get
/// `not_owner`, both sent to `redirect_to`.
pub(crate) async fn owned_event(
    store: &dyn Store,
    user: &User,
    event_id: Uuid,
    not_owner: &str,
    redirect_to: &str,
) -> Result<(Ngo, Event)> {
    if user.role != UserRole::Ngo {
        return Err(Error::forbidden("Access denied.", "/events/"));
    }
    let event = find_event(store, event_id).await?;
    let ngo = ngo_for_user(store, user).await?;
    if event.ngo_id != ngo.id {
        return Err(Error::forbidden(not_owner, redirect_to));
    }
    Ok((ngo, event))
}

pub(crate) async fn registration_views(
    store: &dyn Store,
    filter: &RegistrationFilter,
) -> Result<Vec<RegistrationView>> {
    let registrations = store.list_registrations(filter).await?;
    let mut views = Vec::with_capacity(registrations.len());
    for registration in registrations {
        let Some(volunteer) = store.find_user(registration.volunteer_id).await? else {
            continue;
        };
        let profile = store.find_volunteer_profile(volunteer.id).await?;
        views.push(RegistrationView {
            registration,
            volunteer,
            profile,
        });
    }
    Ok(views)
}

/// Attaches seat counts, organization and certificate state to an event.
pub(crate) async fn summarize(
    store: &dyn Store,
    event: Event,
    now: DateTime<Utc>,
) -> Result<EventSummary> {
    let approved = store
        .count_registrations(event.id, RegistrationStatus::Approved)
        .await?;
    let pending = store
        .count_registrations(event.id, RegistrationStatus::Pending)
        .await?;
    let organization_name = store
        .find_ngo(event.ngo_id)
        .await?
        .map(|n| n.organization_name)
        .unwrap_or_default();
    let certificate_status = store
        .find_certificate_for_event(event.id)
        .await?
        .map(|c| c.status);
    let capacity = event.capacity(approved);
    Ok(EventSummary::new(
        event,
        organization_name,
        capacity,
        pending,
        certificate_status,
        now,
    ))
}

async fn summarize_all(
    store: &dyn Store,
    events: Vec<Event>,
    now: DateTime<Utc>,
) -> Result<Vec<EventSummary>> {
    let mut summaries = Vec::with_capacity(events.len());
    for event in events {
        summaries.push(summarize(store, event, now).await?);
    }
    Ok(summaries)
}

fn parse_status_filter(raw: &Option<String>) -> Result<Option<EventStatus>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(value.parse()?)),
    }
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
    storage: Arc<dyn FileStorage>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn FileStorage>) -> Self {
        Self { store, storage }
    }

    /// Upcoming events only, newest listing first.
    pub async fn list_public(
        &self,
        query: EventListQuery,
        now: DateTime<Utc>,
    ) -> Result<EventListResponse> {
        let status = parse_status_filter(&query.status)?;
        let search = non_empty(query.search);
        let events = self
            .store
            .list_events(&EventFilter {
                status,
                starting_from: Some(now),
                search: search.clone(),
                ..Default::default()
            })
            .await?;
        Ok(EventListResponse {
            events: summarize_all(self.store.as_ref(), events, now).await?,
            search_query: search.unwrap_or_default(),
            status_filter: status.map(|s| s.to_string()).unwrap_or_default(),
        })
    }

    pub async fn detail(
        &self,
        event_id: Uuid,
        viewer: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<EventDetailResponse> {
        let event = find_event(self.store.as_ref(), event_id).await?;

        let user_registration = match viewer {
            Some(user) if user.role == UserRole::Volunteer => {
                self.store.find_registration_for(event.id, user.id).await?
            }
            _ => None,
        };

        let approved = self
            .store
            .list_registrations(&RegistrationFilter {
                event_id: Some(event.id),
                status: Some(RegistrationStatus::Approved),
                ..Default::default()
            })
            .await?;
        let mut approved_volunteers = Vec::with_capacity(approved.len());
        for registration in approved {
            if let Some(user) = self.store.find_user(registration.volunteer_id).await? {
                approved_volunteers.push(user);
            }
        }

        let skills_list = event.skills_list();
        Ok(EventDetailResponse {
            event: summarize(self.store.as_ref(), event, now).await?,
            skills_list,
            user_registration,
            approved_volunteers,
        })
    }

    pub async fn create(
        &self,
        user: &User,
        form: EventForm,
        image: Option<UploadedFile>,
        certificate_file: Option<UploadedFile>,
    ) -> Result<Event> {
        if user.role != UserRole::Ngo {
            return Err(Error::forbidden("Only NGOs can create events.", "/events/"));
        }
        let ngo = ngo_for_user(self.store.as_ref(), user).await?;
        if !ngo.is_approved() {
            return Err(Error::forbidden(
                "Your NGO must be approved before creating events.",
                "/accounts/profile/",
            ));
        }
        let certificate_file = certificate_file.ok_or_else(|| {
            Error::BadRequest("certificate_file: This field is required.".into())
        })?;

        let image = match image {
            Some(file) => Some(self.storage.save(UploadKind::EventImage, &file).await?),
            None => None,
        };
        let certificate_path = self
            .storage
            .save(UploadKind::CertificateTemplate, &certificate_file)
            .await?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            ngo_id: ngo.id,
            title: form.title,
            description: form.description,
            image,
            date: form.date,
            location: form.location,
            required_skills: form.required_skills,
            max_volunteers: form.max_volunteers,
            status: form.status,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_event(&event).await?;
        self.store
            .replace_certificate(&Certificate::new(event.id, certificate_path))
            .await?;

        tracing::info!(event_id = %event.id, ngo_id = %ngo.id, title = %event.title, "event created");
        Ok(event)
    }

    /// Returns true when a new certificate template replaced the old one.
    pub async fn update(
        &self,
        user: &User,
        event_id: Uuid,
        form: EventForm,
        image: Option<UploadedFile>,
        certificate_file: Option<UploadedFile>,
    ) -> Result<bool> {
        let (_, mut event) = owned_event(
            self.store.as_ref(),
            user,
            event_id,
            "You can only edit your own events.",
            "/events/",
        )
        .await?;

        let has_certificate = self
            .store
            .find_certificate_for_event(event.id)
            .await?
            .is_some();
        if !has_certificate && certificate_file.is_none() {
            return Err(Error::BadRequest(
                "certificate_file: This field is required.".into(),
            ));
        }

        if let Some(file) = image {
            event.image = Some(self.storage.save(UploadKind::EventImage, &file).await?);
        }
        event.title = form.title;
        event.description = form.description;
        event.date = form.date;
        event.location = form.location;
        event.required_skills = form.required_skills;
        event.max_volunteers = form.max_volunteers;
        event.status = form.status;
        event.updated_at = Utc::now();
        self.store.update_event(&event).await?;

        let Some(file) = certificate_file else {
            return Ok(false);
        };
        let path = self
            .storage
            .save(UploadKind::CertificateTemplate, &file)
            .await?;
        self.store
            .replace_certificate(&Certificate::new(event.id, path))
            .await?;
        tracing::info!(event_id = %event.id, "certificate template replaced, awaiting approval");
        Ok(true)
    }

    pub async fn delete(&self, user: &User, event_id: Uuid) -> Result<()> {
        let (_, event) = owned_event(
            self.store.as_ref(),
            user,
            event_id,
            "You can only delete your own events.",
            "/events/",
        )
        .await?;
        self.store.delete_event(event.id).await?;
        tracing::info!(event_id = %event.id, "event deleted by owner");
        Ok(())
    }

    pub async fn ngo_events(&self, user: &User, now: DateTime<Utc>) -> Result<NgoEventsResponse> {
        if user.role != UserRole::Ngo {
            return Err(Error::forbidden("Access denied.", "/events/"));
        }
        let ngo = ngo_for_user(self.store.as_ref(), user).await?;
        let events = self
            .store
            .list_events(&EventFilter {
                ngo_id: Some(ngo.id),
                ..Default::default()
            })
            .await?;
        Ok(NgoEventsResponse {
            organization_name: ngo.organization_name,
            events: summarize_all(self.store.as_ref(), events, now).await?,
        })
    }

    pub async fn admin_list(
        &self,
        query: AdminEventsQuery,
        now: DateTime<Utc>,
    ) -> Result<AdminEventListResponse> {
        let status = parse_status_filter(&query.status)?;
        let search = non_empty(query.search);
        let events = self
            .store
            .list_events(&EventFilter {
                status,
                search_with_organization: search.clone(),
                ..Default::default()
            })
            .await?;
        Ok(AdminEventListResponse {
            total_events: events.len(),
            events: summarize_all(self.store.as_ref(), events, now).await?,
            search_query: search.unwrap_or_default(),
            status_filter: status.map(|s| s.to_string()).unwrap_or_default(),
        })
    }

    pub async fn admin_detail(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AdminEventDetailResponse> {
        let event = find_event(self.store.as_ref(), event_id).await?;
        let registrations = registration_views(
            self.store.as_ref(),
            &RegistrationFilter {
                event_id: Some(event.id),
                ..Default::default()
            },
        )
        .await?;
        let certificate = self.store.find_certificate_for_event(event.id).await?;
        let skills_list = event.skills_list();
        Ok(AdminEventDetailResponse {
            event: summarize(self.store.as_ref(), event, now).await?,
            registrations,
            skills_list,
            certificate,
        })
    }

    /// Deletes any event and returns its title.
    pub async fn admin_delete(&self, event_id: Uuid) -> Result<String> {
        let event = find_event(self.store.as_ref(), event_id).await?;
        self.store.delete_event(event.id).await?;
        tracing::info!(event_id = %event.id, "event deleted by admin");
        Ok(event.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::{CertificateRepository, UserRepository};
    use crate::database::MemoryStore;
    use crate::models::{certificate::CertificateStatus, ngo::NgoStatus};
    use crate::services::storage_service::MockFileStorage;
    use chrono::Duration;

    async fn ngo_user(store: &MemoryStore, status: NgoStatus) -> User {
        let user = User::new("org".into(), "org@example.com".into(), "x".into(), UserRole::Ngo);
        let now = Utc::now();
        let ngo = Ngo {
            id: Uuid::new_v4(),
            user_id: user.id,
            organization_name: "Org".into(),
            registration_number: "R-1".into(),
            description: "d".into(),
            logo: None,
            website: String::new(),
            phone: "1".into(),
            email: "org@example.com".into(),
            address: "a".into(),
            city: "c".into(),
            country: "k".into(),
            focus_areas: "f".into(),
            verification_document: None,
            status,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_ngo_account(&user, &ngo).await.unwrap();
        user
    }

    fn form() -> EventForm {
        EventForm {
            title: "River cleanup".into(),
            description: "Bags provided".into(),
            date: Utc::now() + Duration::days(7),
            location: "Bridge".into(),
            required_skills: "Swimming".into(),
            max_volunteers: 5,
            status: EventStatus::Published,
        }
    }

    fn pdf() -> UploadedFile {
        UploadedFile {
            file_name: "cert.pdf".into(),
            content_type: None,
            bytes: bytes::Bytes::from_static(b"%PDF"),
        }
    }

    fn storage_saving(times: usize) -> MockFileStorage {
        let mut storage = MockFileStorage::new();
        storage
            .expect_save()
            .times(times)
            .returning(|kind, _| Ok(format!("{}/{}.pdf", kind.folder(), Uuid::new_v4())));
        storage
    }

    #[tokio::test]
    async fn pending_ngo_cannot_create_events() {
        let store = Arc::new(MemoryStore::new());
        let user = ngo_user(&store, NgoStatus::Pending).await;
        let service = EventService::new(store, Arc::new(MockFileStorage::new()));

        let err = service.create(&user, form(), None, Some(pdf())).await.unwrap_err();
        match err {
            Error::Forbidden { message, .. } => assert!(message.contains("must be approved")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn creating_an_event_stores_a_pending_certificate() {
        let store = Arc::new(MemoryStore::new());
        let user = ngo_user(&store, NgoStatus::Approved).await;
        let service = EventService::new(store.clone(), Arc::new(storage_saving(1)));

        let event = service.create(&user, form(), None, Some(pdf())).await.unwrap();
        let certificate = store.find_certificate_for_event(event.id).await.unwrap().unwrap();
        assert_eq!(certificate.status, CertificateStatus::Pending);
        assert!(certificate.certificate_file.starts_with("certificates/templates/"));
    }

    #[tokio::test]
    async fn event_without_certificate_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let user = ngo_user(&store, NgoStatus::Approved).await;
        let service = EventService::new(store, Arc::new(MockFileStorage::new()));
        assert!(matches!(
            service.create(&user, form(), None, None).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn re_uploaded_certificate_needs_approval_again() {
        let store = Arc::new(MemoryStore::new());
        let user = ngo_user(&store, NgoStatus::Approved).await;
        let service = EventService::new(store.clone(), Arc::new(storage_saving(2)));

        let event = service.create(&user, form(), None, Some(pdf())).await.unwrap();
        let mut certificate = store.find_certificate_for_event(event.id).await.unwrap().unwrap();
        certificate.approve(Utc::now());
        store.update_certificate(&certificate).await.unwrap();

        let replaced = service
            .update(&user, event.id, form(), None, Some(pdf()))
            .await
            .unwrap();
        assert!(replaced);
        let current = store.find_certificate_for_event(event.id).await.unwrap().unwrap();
        assert_ne!(current.id, certificate.id);
        assert_eq!(current.status, CertificateStatus::Pending);

        let unchanged = service.update(&user, event.id, form(), None, None).await.unwrap();
        assert!(!unchanged);
    }
}
