use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{split_comma_list, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Published,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Published => "published",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(EventStatus::Published),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            other => Err(UnknownVariant {
                kind: "event status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for EventStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
    /// Comma-separated skills.
    pub required_skills: String,
    pub max_volunteers: i32,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn skills_list(&self) -> Vec<String> {
        split_comma_list(&self.required_skills)
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }

    pub fn capacity(&self, approved: i64) -> Capacity {
        Capacity {
            max_volunteers: self.max_volunteers as i64,
            approved,
        }
    }
}

/// Seat accounting for an event; only approved registrations take a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capacity {
    pub max_volunteers: i64,
    pub approved: i64,
}

impl Capacity {
    pub fn available_spots(&self) -> i64 {
        self.max_volunteers - self.approved
    }

    pub fn is_full(&self) -> bool {
        self.available_spots() <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(max_volunteers: i32, date: DateTime<Utc>) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            ngo_id: Uuid::new_v4(),
            title: "Beach cleanup".into(),
            description: "Bring gloves".into(),
            image: None,
            date,
            location: "Shore".into(),
            required_skills: "Lifting, Sorting".into(),
            max_volunteers,
            status: EventStatus::Published,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn capacity_counts_down_to_full() {
        let e = event(2, Utc::now());
        assert_eq!(e.capacity(0).available_spots(), 2);
        assert!(!e.capacity(1).is_full());
        assert!(e.capacity(2).is_full());
        assert!(e.capacity(3).is_full());
    }

    #[test]
    fn past_events_are_detected() {
        let now = Utc::now();
        assert!(event(1, now - Duration::hours(1)).is_past(now));
        assert!(!event(1, now + Duration::hours(1)).is_past(now));
    }

    #[test]
    fn skills_are_split_at_render_time() {
        let e = event(1, Utc::now());
        assert_eq!(e.skills_list(), vec!["Lifting", "Sorting"]);
    }
}
