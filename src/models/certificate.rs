use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CertificateStatus {
    pub const ALL: [CertificateStatus; 3] = [
        CertificateStatus::Pending,
        CertificateStatus::Approved,
        CertificateStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Pending => "pending",
            CertificateStatus::Approved => "approved",
            CertificateStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CertificateStatus::Pending),
            "approved" => Ok(CertificateStatus::Approved),
            "rejected" => Ok(CertificateStatus::Rejected),
            other => Err(UnknownVariant {
                kind: "certificate status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CertificateStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Certificate template uploaded by an NGO for one of its events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: Uuid,
    pub event_id: Uuid,
    pub certificate_file: String,
    #[sqlx(try_from = "String")]
    pub status: CertificateStatus,
    pub uploaded_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
}

impl Certificate {
    pub fn new(event_id: Uuid, certificate_file: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            certificate_file,
            status: CertificateStatus::Pending,
            uploaded_at: Utc::now(),
            approved_at: None,
            rejected_at: None,
        }
    }

    pub fn approve(&mut self, at: DateTime<Utc>) {
        self.status = CertificateStatus::Approved;
        self.approved_at = Some(at);
        self.rejected_at = None;
    }

    pub fn is_approved(&self) -> bool {
        self.status == CertificateStatus::Approved
    }
}

/// Which volunteers received a certificate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CertificateAssignment {
    pub id: Uuid,
    pub certificate_id: Uuid,
    pub volunteer_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

impl CertificateAssignment {
    pub fn new(certificate_id: Uuid, volunteer_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            certificate_id,
            volunteer_id,
            assigned_at: Utc::now(),
        }
    }
}
