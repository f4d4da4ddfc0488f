use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::store::{RegistrationFilter, Store};
use crate::dto::event_dto::{ManageRegistrationsResponse, MyEventEntry};
use crate::error::{Error, Result};
use crate::models::{
    registration::{ApprovalOutcome, EventRegistration, RegistrationStatus},
    user::{User, UserRole},
};
use crate::services::event_service::{find_event, owned_event, registration_views, summarize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Withdrawn,
    AlreadyWithdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Changed,
    Unchanged,
}

fn event_path(event_id: Uuid) -> String {
    format!("/events/{}/", event_id)
}

fn manage_path(event_id: Uuid) -> String {
    format!("/events/{}/manage/", event_id)
}

fn not_pending(status: RegistrationStatus, back: String) -> Error {
    Error::rejected(
        format!("Only pending applications can be approved (this one is {}).", status),
        back,
    )
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn Store>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Files a pending application for `event_id`.
    pub async fn register(
        &self,
        user: &User,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<EventRegistration> {
        let back = event_path(event_id);
        if user.role != UserRole::Volunteer {
            return Err(Error::forbidden(
                "Only volunteers can register for events.",
                back,
            ));
        }
        let event = find_event(self.store.as_ref(), event_id).await?;
        if event.is_past(now) {
            return Err(Error::rejected("Cannot register for past events.", back));
        }
        if self
            .store
            .find_registration_for(event.id, user.id)
            .await?
            .is_some()
        {
            return Err(Error::rejected(
                "You have already applied for this event.",
                back,
            ));
        }
        let approved = self
            .store
            .count_registrations(event.id, RegistrationStatus::Approved)
            .await?;
        if event.capacity(approved).is_full() {
            return Err(Error::rejected("This event is at full capacity.", back));
        }

        let registration = EventRegistration::new(event.id, user.id);
        self.store
            .insert_registration(&registration)
            .await
            .map_err(|err| match err {
                Error::Conflict(_) => Error::rejected(
                    "You have already applied for this event.",
                    event_path(event_id),
                ),
                other => other,
            })?;
        tracing::info!(
            registration_id = %registration.id,
            event_id = %event.id,
            volunteer_id = %user.id,
            "registration submitted"
        );
        Ok(registration)
    }

    pub async fn withdraw(&self, user: &User, registration_id: Uuid) -> Result<WithdrawOutcome> {
        if user.role != UserRole::Volunteer {
            return Err(Error::forbidden("Access denied.", "/events/"));
        }
        let registration = self
            .store
            .find_registration(registration_id)
            .await?
            .filter(|r| r.volunteer_id == user.id)
            .ok_or_else(|| Error::NotFound("Registration not found".into()))?;

        match registration.status {
            RegistrationStatus::Withdrawn => Ok(WithdrawOutcome::AlreadyWithdrawn),
            status if status.can_transition_to(RegistrationStatus::Withdrawn) => {
                self.store
                    .set_registration_status(registration.id, RegistrationStatus::Withdrawn)
                    .await?;
                tracing::info!(registration_id = %registration.id, from = %status, "registration withdrawn");
                Ok(WithdrawOutcome::Withdrawn)
            }
            _ => Err(Error::rejected(
                "A rejected application cannot be withdrawn.",
                "/events/my-events/",
            )),
        }
    }

    async fn reviewable(&self, user: &User, registration_id: Uuid) -> Result<(EventRegistration, User)> {
        if user.role != UserRole::Ngo {
            return Err(Error::forbidden("Access denied.", "/events/"));
        }
        let registration = self
            .store
            .find_registration(registration_id)
            .await?
            .ok_or_else(|| Error::NotFound("Registration not found".into()))?;
        owned_event(
            self.store.as_ref(),
            user,
            registration.event_id,
            "Access denied.",
            "/events/ngo-events/",
        )
        .await?;
        let volunteer = self
            .store
            .find_user(registration.volunteer_id)
            .await?
            .ok_or_else(|| Error::NotFound("Volunteer not found".into()))?;
        Ok((registration, volunteer))
    }

    /// Approves a pending application if a seat is left. Approving an
    /// already approved one changes nothing.
    pub async fn approve(
        &self,
        user: &User,
        registration_id: Uuid,
    ) -> Result<(EventRegistration, String, ReviewOutcome)> {
        let (mut registration, volunteer) = self.reviewable(user, registration_id).await?;
        let back = manage_path(registration.event_id);

        match registration.status {
            RegistrationStatus::Approved => {
                return Ok((registration, volunteer.username, ReviewOutcome::Unchanged))
            }
            RegistrationStatus::Pending => {}
            other => return Err(not_pending(other, back)),
        }

        match self.store.approve_registration(registration.id).await? {
            ApprovalOutcome::Approved => {
                registration.status = RegistrationStatus::Approved;
                tracing::info!(
                    registration_id = %registration.id,
                    event_id = %registration.event_id,
                    "registration approved"
                );
                Ok((registration, volunteer.username, ReviewOutcome::Changed))
            }
            ApprovalOutcome::EventFull => {
                tracing::warn!(event_id = %registration.event_id, "approval refused, event full");
                Err(Error::rejected("Event is at full capacity.", back))
            }
            ApprovalOutcome::NotPending(current) => {
                tracing::warn!(
                    registration_id = %registration.id,
                    status = %current,
                    "approval lost to a concurrent status change"
                );
                Err(not_pending(current, back))
            }
        }
    }

    pub async fn reject(
        &self,
        user: &User,
        registration_id: Uuid,
    ) -> Result<(EventRegistration, String)> {
        let (mut registration, volunteer) = self.reviewable(user, registration_id).await?;
        if !registration
            .status
            .can_transition_to(RegistrationStatus::Rejected)
        {
            return Err(Error::rejected(
                format!(
                    "Only pending applications can be rejected (this one is {}).",
                    registration.status
                ),
                manage_path(registration.event_id),
            ));
        }
        self.store
            .set_registration_status(registration.id, RegistrationStatus::Rejected)
            .await?;
        registration.status = RegistrationStatus::Rejected;
        tracing::info!(registration_id = %registration.id, "registration rejected");
        Ok((registration, volunteer.username))
    }

    pub async fn manage(
        &self,
        user: &User,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ManageRegistrationsResponse> {
        let (_, event) = owned_event(
            self.store.as_ref(),
            user,
            event_id,
            "You can only manage your own events.",
            "/events/ngo-events/",
        )
        .await?;
        let registrations = registration_views(
            self.store.as_ref(),
            &RegistrationFilter {
                event_id: Some(event.id),
                exclude_withdrawn: true,
                ..Default::default()
            },
        )
        .await?;
        Ok(ManageRegistrationsResponse {
            event: summarize(self.store.as_ref(), event, now).await?,
            registrations,
        })
    }

    pub async fn my_events(&self, user: &User) -> Result<Vec<MyEventEntry>> {
        if user.role != UserRole::Volunteer {
            return Err(Error::forbidden("Access denied.", "/events/"));
        }
        let registrations = self
            .store
            .list_registrations(&RegistrationFilter {
                volunteer_id: Some(user.id),
                exclude_withdrawn: true,
                ..Default::default()
            })
            .await?;

        let mut entries = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let Some(event) = self.store.find_event(registration.event_id).await? else {
                continue;
            };
            let organization_name = self
                .store
                .find_ngo(event.ngo_id)
                .await?
                .map(|n| n.organization_name)
                .unwrap_or_default();
            entries.push(MyEventEntry {
                registration,
                event,
                organization_name,
            });
        }
        Ok(entries)
    }
}
