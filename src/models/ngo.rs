use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{split_comma_list, UnknownVariant};

/// Verification state of an NGO. Only approved NGOs may publish events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NgoStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl NgoStatus {
    pub const ALL: [NgoStatus; 3] = [NgoStatus::Pending, NgoStatus::Approved, NgoStatus::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            NgoStatus::Pending => "pending",
            NgoStatus::Approved => "approved",
            NgoStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for NgoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NgoStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NgoStatus::Pending),
            "approved" => Ok(NgoStatus::Approved),
            "rejected" => Ok(NgoStatus::Rejected),
            other => Err(UnknownVariant {
                kind: "ngo status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for NgoStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ngo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_name: String,
    pub registration_number: String,
    pub description: String,
    pub logo: Option<String>,
    pub website: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub country: String,
    /// Comma-separated focus areas.
    pub focus_areas: String,
    pub verification_document: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: NgoStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ngo {
    pub fn is_approved(&self) -> bool {
        self.status == NgoStatus::Approved
    }

    pub fn focus_areas_list(&self) -> Vec<String> {
        split_comma_list(&self.focus_areas)
    }

    pub fn approve(&mut self, at: DateTime<Utc>) {
        self.status = NgoStatus::Approved;
        self.approved_at = Some(at);
        self.updated_at = at;
    }

    pub fn reject(&mut self, at: DateTime<Utc>) {
        self.status = NgoStatus::Rejected;
        self.approved_at = None;
        self.updated_at = at;
    }

    /// Replaces the verification document. An approved NGO goes back to
    /// review; returns true when that happened.
    pub fn replace_verification_document(&mut self, path: String) -> bool {
        self.verification_document = Some(path);
        if self.status == NgoStatus::Approved {
            self.status = NgoStatus::Pending;
            return true;
        }
        false
    }
}
