use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Allowed moves: pending -> approved | rejected | withdrawn,
    /// approved -> withdrawn. Rejected and withdrawn are terminal.
    pub fn can_transition_to(&self, next: RegistrationStatus) -> bool {
        use RegistrationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Withdrawn) | (Approved, Withdrawn)
        )
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "approved" => Ok(RegistrationStatus::Approved),
            "rejected" => Ok(RegistrationStatus::Rejected),
            "withdrawn" => Ok(RegistrationStatus::Withdrawn),
            other => Err(UnknownVariant {
                kind: "registration status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for RegistrationStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub volunteer_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: RegistrationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventRegistration {
    pub fn new(event_id: Uuid, volunteer_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            event_id,
            volunteer_id,
            status: RegistrationStatus::Pending,
            applied_at: now,
            updated_at: now,
        }
    }
}

/// Result of the atomic capacity-checked approval performed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved,
    EventFull,
    /// The registration left `pending` before the approval got the lock.
    NotPending(RegistrationStatus),
}

#[cfg(test)]
mod tests {
    use super::RegistrationStatus::*;

    #[test]
    fn pending_can_move_anywhere_but_back() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Withdrawn));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn approved_only_withdraws() {
        assert!(Approved.can_transition_to(Withdrawn));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
    }

    #[test]
    fn rejected_and_withdrawn_are_terminal() {
        for next in [Pending, Approved, Rejected, Withdrawn] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Withdrawn.can_transition_to(next));
        }
    }
}
