use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    certificate::{Certificate, CertificateAssignment},
    event::Event,
    ngo::Ngo,
    user::User,
    volunteer_profile::VolunteerProfile,
};

use super::event_dto::RegistrationView;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignCertificatesPayload {
    #[serde(default)]
    pub volunteers: Vec<Uuid>,
}

/// Outcome of one assignment batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentReport {
    pub assigned: usize,
    pub already_assigned: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentOverview {
    pub event: Event,
    pub certificate: Certificate,
    pub registrations: Vec<RegistrationView>,
    pub assigned_volunteer_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MyCertificateEntry {
    pub assignment: CertificateAssignment,
    pub certificate: Certificate,
    pub event: Event,
    pub organization_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificateApprovalsQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateEntry {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub event_title: String,
    pub organization_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateApprovalsResponse {
    pub certificates: Vec<CertificateEntry>,
    pub status_filter: String,
    pub search_query: String,
    pub sort_by: String,
    pub pending_count: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub assignment: CertificateAssignment,
    pub volunteer: User,
    pub profile: Option<VolunteerProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateDetailResponse {
    pub certificate: Certificate,
    pub event: Event,
    pub ngo: Ngo,
    pub assignments: Vec<AssignmentView>,
    pub assignments_count: usize,
}
