use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::{ngo::Ngo, user::User, volunteer_profile::VolunteerProfile};
use crate::utils::form::FormData;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterVolunteerPayload {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "This password is too short."))]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
    #[validate(length(max = 15))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterNgoPayload {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "This password is too short."))]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
    #[validate(length(min = 1, max = 200))]
    pub organization_name: String,
    #[validate(length(min = 1, max = 100))]
    pub registration_number: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 15))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 1))]
    pub focus_areas: String,
    #[validate(url)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfileView {
    Volunteer {
        user: User,
        profile: VolunteerProfile,
        skills_list: Vec<String>,
        interests_list: Vec<String>,
    },
    Ngo {
        user: User,
        profile: Ngo,
        focus_areas_list: Vec<String>,
    },
}

/// Text fields of the volunteer profile edit form. Absent fields clear the
/// stored value.
#[derive(Debug, Clone, Validate)]
pub struct VolunteerProfileForm {
    pub first_name: String,
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 15))]
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: String,
    pub skills: String,
    pub interests: String,
    pub availability: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl VolunteerProfileForm {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let date_of_birth = match form.text("date_of_birth") {
            Some(raw) if !raw.is_empty() => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| Error::BadRequest("Enter a valid date.".into()))?,
            ),
            _ => None,
        };
        Ok(Self {
            first_name: form.text_or_default("first_name"),
            last_name: form.text_or_default("last_name"),
            email: form.text_or_default("email"),
            phone: form.text_or_default("phone"),
            date_of_birth,
            bio: form.text_or_default("bio"),
            skills: form.text_or_default("skills"),
            interests: form.text_or_default("interests"),
            availability: form.text_or_default("availability"),
            address: form.text_or_default("address"),
            city: form.text_or_default("city"),
            country: form.text_or_default("country"),
        })
    }
}

/// Text fields of the organization profile edit form. The registration
/// number is read-only and never taken from the form.
#[derive(Debug, Clone, Validate)]
pub struct NgoProfileForm {
    #[validate(length(min = 1, max = 200))]
    pub organization_name: String,
    pub website: String,
    pub description: String,
    pub focus_areas: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 15))]
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl NgoProfileForm {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            organization_name: form.text_or_default("organization_name"),
            website: form.text_or_default("website"),
            description: form.text_or_default("description"),
            focus_areas: form.text_or_default("focus_areas"),
            email: form.text_or_default("email"),
            phone: form.text_or_default("phone"),
            address: form.text_or_default("address"),
            city: form.text_or_default("city"),
            country: form.text_or_default("country"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicVolunteerProfile {
    pub volunteer: User,
    pub profile: VolunteerProfile,
    pub skills_list: Vec<String>,
    pub interests_list: Vec<String>,
}
