use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::store::{CertificateFilter, RegistrationFilter, Store};
use crate::dto::certificate_dto::{
    AssignmentOverview, AssignmentReport, AssignmentView, CertificateApprovalsQuery,
    CertificateApprovalsResponse, CertificateDetailResponse, CertificateEntry, MyCertificateEntry,
};
use crate::error::{Error, Result};
use crate::models::{
    certificate::{Certificate, CertificateAssignment, CertificateStatus},
    event::Event,
    registration::RegistrationStatus,
    user::{User, UserRole},
};
use crate::services::event_service::{find_event, non_empty, owned_event, registration_views};
use crate::services::storage_service::FileStorage;

const NGO_EVENTS: &str = "/events/ngo-events/";

fn admin_event_path(event_id: Uuid) -> String {
    format!("/admin-panel/event/{}/detail/", event_id)
}

#[derive(Clone)]
pub struct CertificateService {
    store: Arc<dyn Store>,
    storage: Arc<dyn FileStorage>,
}

impl CertificateService {
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn FileStorage>) -> Self {
        Self { store, storage }
    }

    async fn find(&self, certificate_id: Uuid) -> Result<(Certificate, Event)> {
        let certificate = self
            .store
            .find_certificate(certificate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Certificate not found".into()))?;
        let event = find_event(self.store.as_ref(), certificate.event_id).await?;
        Ok((certificate, event))
    }

    async fn for_event(&self, event_id: Uuid) -> Result<(Certificate, Event)> {
        let event = find_event(self.store.as_ref(), event_id).await?;
        let certificate = self
            .store
            .find_certificate_for_event(event.id)
            .await?
            .ok_or_else(|| {
                Error::rejected(
                    "This event does not have a certificate.",
                    admin_event_path(event_id),
                )
            })?;
        Ok((certificate, event))
    }

    async fn mark_approved(&self, mut certificate: Certificate) -> Result<Certificate> {
        certificate.approve(Utc::now());
        self.store.update_certificate(&certificate).await?;
        tracing::info!(
            certificate_id = %certificate.id,
            event_id = %certificate.event_id,
            "certificate approved"
        );
        Ok(certificate)
    }

    /// Rejection drops the record and its template file; the organization
    /// has to upload a new one.
    async fn discard(&self, certificate: Certificate) -> Result<()> {
        self.store.delete_certificate(certificate.id).await?;
        if let Err(err) = self.storage.remove(&certificate.certificate_file).await {
            tracing::warn!(error = %err, path = %certificate.certificate_file, "could not remove rejected template");
        }
        tracing::info!(
            certificate_id = %certificate.id,
            event_id = %certificate.event_id,
            "certificate rejected and deleted"
        );
        Ok(())
    }

    /// Returns the title of the event the certificate belongs to.
    pub async fn approve(&self, certificate_id: Uuid) -> Result<String> {
        let (certificate, event) = self.find(certificate_id).await?;
        self.mark_approved(certificate).await?;
        Ok(event.title)
    }

    pub async fn reject(&self, certificate_id: Uuid) -> Result<String> {
        let (certificate, event) = self.find(certificate_id).await?;
        self.discard(certificate).await?;
        Ok(event.title)
    }

    pub async fn approve_for_event(&self, event_id: Uuid) -> Result<String> {
        let (certificate, event) = self.for_event(event_id).await?;
        self.mark_approved(certificate).await?;
        Ok(event.title)
    }

    pub async fn reject_for_event(&self, event_id: Uuid) -> Result<String> {
        let (certificate, event) = self.for_event(event_id).await?;
        self.discard(certificate).await?;
        Ok(event.title)
    }

    pub async fn approvals(
        &self,
        query: CertificateApprovalsQuery,
    ) -> Result<CertificateApprovalsResponse> {
        let status_filter = non_empty(query.status).unwrap_or_else(|| "pending".to_string());
        let status = match status_filter.as_str() {
            "all" => None,
            other => Some(other.parse::<CertificateStatus>()?),
        };
        let search = non_empty(query.search);
        let sort_by = match query.sort.as_deref() {
            Some("oldest") => "oldest",
            _ => "newest",
        };

        let certificates = self
            .store
            .list_certificates(&CertificateFilter {
                status,
                search: search.clone(),
                oldest_first: sort_by == "oldest",
            })
            .await?;
        let mut entries = Vec::with_capacity(certificates.len());
        for certificate in certificates {
            let Some(event) = self.store.find_event(certificate.event_id).await? else {
                continue;
            };
            let organization_name = self
                .store
                .find_ngo(event.ngo_id)
                .await?
                .map(|n| n.organization_name)
                .unwrap_or_default();
            entries.push(CertificateEntry {
                certificate,
                event_title: event.title,
                organization_name,
            });
        }

        Ok(CertificateApprovalsResponse {
            certificates: entries,
            status_filter,
            search_query: search.unwrap_or_default(),
            sort_by: sort_by.to_string(),
            pending_count: self
                .store
                .count_certificates(Some(CertificateStatus::Pending))
                .await?,
            approved_count: self
                .store
                .count_certificates(Some(CertificateStatus::Approved))
                .await?,
            rejected_count: self
                .store
                .count_certificates(Some(CertificateStatus::Rejected))
                .await?,
            total_count: self.store.count_certificates(None).await?,
        })
    }

    pub async fn detail(&self, certificate_id: Uuid) -> Result<CertificateDetailResponse> {
        let (certificate, event) = self.find(certificate_id).await?;
        let ngo = self
            .store
            .find_ngo(event.ngo_id)
            .await?
            .ok_or_else(|| Error::NotFound("NGO not found".into()))?;

        let mut assignments = Vec::new();
        for assignment in self
            .store
            .list_assignments_for_certificate(certificate.id)
            .await?
        {
            let Some(volunteer) = self.store.find_user(assignment.volunteer_id).await? else {
                continue;
            };
            let profile = self.store.find_volunteer_profile(volunteer.id).await?;
            assignments.push(AssignmentView {
                assignment,
                volunteer,
                profile,
            });
        }

        Ok(CertificateDetailResponse {
            assignments_count: assignments.len(),
            certificate,
            event,
            ngo,
            assignments,
        })
    }

    /// The caller's event with its approved certificate, or the refusal
    /// explaining why nothing can be assigned yet.
    async fn assignable(&self, user: &User, event_id: Uuid) -> Result<(Event, Certificate)> {
        let (_, event) = owned_event(
            self.store.as_ref(),
            user,
            event_id,
            "You can only assign certificates for your own events.",
            NGO_EVENTS,
        )
        .await?;
        let certificate = self
            .store
            .find_certificate_for_event(event.id)
            .await?
            .ok_or_else(|| {
                Error::rejected("This event does not have a certificate uploaded.", NGO_EVENTS)
            })?;
        if !certificate.is_approved() {
            return Err(Error::rejected(
                format!(
                    "Certificate is {}. Only approved certificates can be assigned.",
                    certificate.status
                ),
                NGO_EVENTS,
            ));
        }
        Ok((event, certificate))
    }

    async fn assigned_ids(&self, certificate_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .store
            .list_assignments_for_certificate(certificate_id)
            .await?
            .into_iter()
            .map(|a| a.volunteer_id)
            .collect())
    }

    pub async fn assignment_overview(
        &self,
        user: &User,
        event_id: Uuid,
    ) -> Result<AssignmentOverview> {
        let (event, certificate) = self.assignable(user, event_id).await?;
        let registrations = registration_views(
            self.store.as_ref(),
            &RegistrationFilter {
                event_id: Some(event.id),
                status: Some(RegistrationStatus::Approved),
                ..Default::default()
            },
        )
        .await?;
        let assigned_volunteer_ids = self.assigned_ids(certificate.id).await?;
        Ok(AssignmentOverview {
            event,
            certificate,
            registrations,
            assigned_volunteer_ids,
        })
    }

    /// Assigns the event's certificate to each selected volunteer holding an
    /// approved registration. Each insert stands on its own.
    pub async fn assign(
        &self,
        user: &User,
        event_id: Uuid,
        volunteer_ids: &[Uuid],
    ) -> Result<AssignmentReport> {
        let (event, certificate) = self.assignable(user, event_id).await?;
        let mut report = AssignmentReport::default();
        if volunteer_ids.is_empty() {
            return Ok(report);
        }

        let mut assigned: HashSet<Uuid> =
            self.assigned_ids(certificate.id).await?.into_iter().collect();
        let approved: HashSet<Uuid> = self
            .store
            .list_registrations(&RegistrationFilter {
                event_id: Some(event.id),
                status: Some(RegistrationStatus::Approved),
                ..Default::default()
            })
            .await?
            .into_iter()
            .map(|r| r.volunteer_id)
            .collect();

        for volunteer_id in volunteer_ids {
            if assigned.contains(volunteer_id) {
                report.already_assigned += 1;
                continue;
            }
            if !approved.contains(volunteer_id) {
                tracing::debug!(%volunteer_id, event_id = %event.id, "skipping volunteer without approved registration");
                continue;
            }
            match self
                .store
                .insert_assignment(&CertificateAssignment::new(certificate.id, *volunteer_id))
                .await
            {
                Ok(()) => {
                    assigned.insert(*volunteer_id);
                    report.assigned += 1;
                }
                Err(Error::Conflict(_)) => report.already_assigned += 1,
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            certificate_id = %certificate.id,
            assigned = report.assigned,
            already_assigned = report.already_assigned,
            "certificates assigned"
        );
        Ok(report)
    }

    pub async fn my_certificates(&self, user: &User) -> Result<Vec<MyCertificateEntry>> {
        if user.role != UserRole::Volunteer {
            return Err(Error::forbidden("Access denied.", "/"));
        }
        let mut entries = Vec::new();
        for assignment in self.store.list_assignments_for_volunteer(user.id).await? {
            let Some(certificate) = self.store.find_certificate(assignment.certificate_id).await?
            else {
                continue;
            };
            let Some(event) = self.store.find_event(certificate.event_id).await? else {
                continue;
            };
            let organization_name = self
                .store
                .find_ngo(event.ngo_id)
                .await?
                .map(|n| n.organization_name)
                .unwrap_or_default();
            entries.push(MyCertificateEntry {
                assignment,
                certificate,
                event,
                organization_name,
            });
        }
        Ok(entries)
    }
}
