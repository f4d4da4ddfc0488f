use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::split_comma_list;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VolunteerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: String,
    pub profile_picture: Option<String>,
    pub address: String,
    pub city: String,
    pub country: String,
    /// Comma-separated skills.
    pub skills: String,
    /// Comma-separated interests.
    pub interests: String,
    pub availability: String,
    pub hours_completed: i32,
    pub events_completed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VolunteerProfile {
    pub fn new(user_id: Uuid, phone: String, date_of_birth: Option<NaiveDate>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            phone,
            date_of_birth,
            bio: String::new(),
            profile_picture: None,
            address: String::new(),
            city: String::new(),
            country: String::new(),
            skills: String::new(),
            interests: String::new(),
            availability: String::new(),
            hours_completed: 0,
            events_completed: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn skills_list(&self) -> Vec<String> {
        split_comma_list(&self.skills)
    }

    pub fn interests_list(&self) -> Vec<String> {
        split_comma_list(&self.interests)
    }
}
