use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::database::store::{RegistrationFilter, Store, UserFilter};
use crate::dto::account_dto::{
    LoginPayload, NgoProfileForm, ProfileView, PublicVolunteerProfile, RegisterNgoPayload,
    RegisterVolunteerPayload, VolunteerProfileForm,
};
use crate::dto::admin_dto::{UserDetailResponse, UserListResponse};
use crate::error::{Error, Result};
use crate::models::{
    ngo::{Ngo, NgoStatus},
    user::{User, UserRole},
    volunteer_profile::VolunteerProfile,
};
use crate::services::storage_service::{FileStorage, UploadKind};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::form::UploadedFile;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    storage: Arc<dyn FileStorage>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn FileStorage>) -> Self {
        Self { store, storage }
    }

    async fn ensure_unique_identity(&self, username: &str, email: &str) -> Result<()> {
        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(Error::Conflict(
                "A user with that username already exists.".into(),
            ));
        }
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(Error::Conflict("A user with that email already exists.".into()));
        }
        Ok(())
    }

    pub async fn register_volunteer(&self, payload: RegisterVolunteerPayload) -> Result<User> {
        payload.validate()?;
        let username = payload.username.trim().to_string();
        let email = payload.email.trim().to_string();
        self.ensure_unique_identity(&username, &email).await?;

        let user = User::new(
            username,
            email,
            hash_password(&payload.password1)?,
            UserRole::Volunteer,
        );
        let profile = VolunteerProfile::new(
            user.id,
            payload.phone.unwrap_or_default(),
            payload.date_of_birth,
        );
        self.store.insert_volunteer_account(&user, &profile).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "volunteer registered");
        Ok(user)
    }

    pub async fn register_ngo(&self, payload: RegisterNgoPayload) -> Result<User> {
        payload.validate()?;
        let username = payload.username.trim().to_string();
        let email = payload.email.trim().to_string();
        self.ensure_unique_identity(&username, &email).await?;

        let registration_number = payload.registration_number.trim().to_string();
        if self
            .store
            .find_ngo_by_registration_number(&registration_number)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "NGO with this Registration number already exists.".into(),
            ));
        }

        let user = User::new(
            username,
            email.clone(),
            hash_password(&payload.password1)?,
            UserRole::Ngo,
        );
        let now = Utc::now();
        let ngo = Ngo {
            id: Uuid::new_v4(),
            user_id: user.id,
            organization_name: payload.organization_name,
            registration_number,
            description: payload.description,
            logo: None,
            website: payload.website.unwrap_or_default(),
            phone: payload.phone,
            email,
            address: payload.address,
            city: payload.city,
            country: payload.country,
            focus_areas: payload.focus_areas,
            verification_document: None,
            status: NgoStatus::Pending,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_ngo_account(&user, &ngo).await?;

        tracing::info!(
            user_id = %user.id,
            ngo_id = %ngo.id,
            organization = %ngo.organization_name,
            "ngo registered, awaiting approval"
        );
        Ok(user)
    }

    pub async fn authenticate(&self, payload: &LoginPayload) -> Result<User> {
        payload.validate()?;
        let user = self
            .store
            .find_user_by_username(payload.username.trim())
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.into()))?;

        if !verify_password(&payload.password, &user.password_hash) {
            tracing::warn!(username = %user.username, "failed login attempt");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        Ok(user)
    }

    /// Loads an active user for a session subject.
    pub async fn session_user(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| Error::Unauthorized("Please log in to continue.".into()))
    }

    /// `None` for roles without a profile page.
    pub async fn profile(&self, user: &User) -> Result<Option<ProfileView>> {
        match user.role {
            UserRole::Volunteer => {
                let profile = self.volunteer_profile(user.id).await?;
                Ok(Some(ProfileView::Volunteer {
                    skills_list: profile.skills_list(),
                    interests_list: profile.interests_list(),
                    user: user.clone(),
                    profile,
                }))
            }
            UserRole::Ngo => {
                let profile = self.ngo_of(user).await?;
                Ok(Some(ProfileView::Ngo {
                    focus_areas_list: profile.focus_areas_list(),
                    user: user.clone(),
                    profile,
                }))
            }
            UserRole::Admin => Ok(None),
        }
    }

    async fn volunteer_profile(&self, user_id: Uuid) -> Result<VolunteerProfile> {
        self.store
            .find_volunteer_profile(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Volunteer profile not found".into()))
    }

    async fn ngo_of(&self, user: &User) -> Result<Ngo> {
        self.store
            .find_ngo_by_user(user.id)
            .await?
            .ok_or_else(|| Error::NotFound("NGO profile not found".into()))
    }

    pub async fn update_volunteer_profile(
        &self,
        user: &User,
        form: VolunteerProfileForm,
        picture: Option<UploadedFile>,
    ) -> Result<()> {
        if user.role != UserRole::Volunteer {
            return Err(Error::forbidden("Access denied.", "/accounts/profile/"));
        }
        form.validate()?;
        let mut profile = self.volunteer_profile(user.id).await?;

        let mut updated_user = user.clone();
        updated_user.first_name = form.first_name;
        updated_user.last_name = form.last_name;
        updated_user.email = form.email;
        self.store.update_user(&updated_user).await?;

        if let Some(file) = picture {
            profile.profile_picture = Some(
                self.storage
                    .save(UploadKind::VolunteerPicture, &file)
                    .await?,
            );
        }
        profile.phone = form.phone;
        profile.date_of_birth = form.date_of_birth;
        profile.bio = form.bio;
        profile.skills = form.skills;
        profile.interests = form.interests;
        profile.availability = form.availability;
        profile.address = form.address;
        profile.city = form.city;
        profile.country = form.country;
        profile.updated_at = Utc::now();
        self.store.update_volunteer_profile(&profile).await?;

        tracing::info!(user_id = %user.id, "volunteer profile updated");
        Ok(())
    }

    /// Returns true when a new verification document sent an approved
    /// organization back to review.
    pub async fn update_ngo_profile(
        &self,
        user: &User,
        form: NgoProfileForm,
        logo: Option<UploadedFile>,
        verification_document: Option<UploadedFile>,
    ) -> Result<bool> {
        if user.role != UserRole::Ngo {
            return Err(Error::forbidden("Access denied.", "/accounts/profile/"));
        }
        form.validate()?;
        let mut ngo = self.ngo_of(user).await?;

        ngo.organization_name = form.organization_name;
        ngo.website = form.website;
        ngo.description = form.description;
        ngo.focus_areas = form.focus_areas;
        ngo.email = form.email;
        ngo.phone = form.phone;
        ngo.address = form.address;
        ngo.city = form.city;
        ngo.country = form.country;

        if let Some(file) = logo {
            ngo.logo = Some(self.storage.save(UploadKind::NgoLogo, &file).await?);
        }

        let mut needs_reverification = false;
        if let Some(file) = verification_document {
            let path = self
                .storage
                .save(UploadKind::VerificationDocument, &file)
                .await?;
            needs_reverification = ngo.replace_verification_document(path);
        }
        ngo.updated_at = Utc::now();
        self.store.update_ngo(&ngo).await?;

        if needs_reverification {
            tracing::info!(ngo_id = %ngo.id, "verification document replaced, ngo back to pending");
        }
        Ok(needs_reverification)
    }

    /// Volunteer profile as seen by an organization, an admin, or its owner.
    pub async fn public_volunteer_profile(
        &self,
        viewer: &User,
        user_id: Uuid,
    ) -> Result<PublicVolunteerProfile> {
        if viewer.role == UserRole::Volunteer && viewer.id != user_id {
            return Err(Error::forbidden("Access denied.", "/events/"));
        }
        let volunteer = self
            .store
            .find_user(user_id)
            .await?
            .filter(|u| u.role == UserRole::Volunteer)
            .ok_or_else(|| Error::NotFound("Volunteer not found".into()))?;
        let profile = self.volunteer_profile(volunteer.id).await?;
        Ok(PublicVolunteerProfile {
            skills_list: profile.skills_list(),
            interests_list: profile.interests_list(),
            volunteer,
            profile,
        })
    }

    pub async fn list_volunteers(&self, search: Option<String>) -> Result<UserListResponse> {
        let search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let volunteers = self
            .store
            .list_users(&UserFilter {
                role: Some(UserRole::Volunteer),
                search: search.clone(),
            })
            .await?;
        Ok(UserListResponse {
            total_volunteers: volunteers.len(),
            search_query: search.unwrap_or_default(),
            volunteers,
        })
    }

    async fn find_volunteer(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .filter(|u| u.role == UserRole::Volunteer)
            .ok_or_else(|| Error::NotFound("Volunteer not found".into()))
    }

    pub async fn volunteer_detail(&self, user_id: Uuid) -> Result<UserDetailResponse> {
        let volunteer = self.find_volunteer(user_id).await?;
        let profile = self.store.find_volunteer_profile(user_id).await?;
        let registrations = self
            .store
            .list_registrations(&RegistrationFilter {
                volunteer_id: Some(user_id),
                ..Default::default()
            })
            .await?;
        Ok(UserDetailResponse {
            volunteer,
            profile,
            registrations,
        })
    }

    /// Deletes a volunteer account and returns its username.
    pub async fn delete_volunteer(&self, user_id: Uuid) -> Result<String> {
        let volunteer = self.find_volunteer(user_id).await?;
        self.store.delete_user(volunteer.id).await?;
        tracing::info!(user_id = %volunteer.id, username = %volunteer.username, "volunteer deleted");
        Ok(volunteer.username)
    }

    /// Creates the administrator account when no user holds `username` yet.
    pub async fn ensure_admin(&self, username: &str, email: &str, password: &str) -> Result<bool> {
        if self.store.find_user_by_username(username).await?.is_some() {
            return Ok(false);
        }
        let mut admin = User::new(
            username.to_string(),
            email.to_string(),
            hash_password(password)?,
            UserRole::Admin,
        );
        admin.first_name = "Admin".to_string();
        self.store.insert_user(&admin).await?;
        tracing::info!(username = %admin.username, "administrator account created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::storage_service::MockFileStorage;

    fn ngo_payload(username: &str, email: &str, number: &str) -> RegisterNgoPayload {
        RegisterNgoPayload {
            username: username.into(),
            email: email.into(),
            password1: "long-enough".into(),
            password2: "long-enough".into(),
            organization_name: "Helping Hands".into(),
            registration_number: number.into(),
            description: "We help".into(),
            phone: "555".into(),
            address: "1 Main".into(),
            city: "Town".into(),
            country: "Land".into(),
            focus_areas: "Food, Shelter".into(),
            website: None,
        }
    }

    #[tokio::test]
    async fn new_verification_document_sends_approved_ngo_back_to_review() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut storage = MockFileStorage::new();
        storage
            .expect_save()
            .withf(|kind, _| *kind == UploadKind::VerificationDocument)
            .times(1)
            .returning(|kind, _| Ok(format!("{}/doc.pdf", kind.folder())));
        let service = AccountService::new(store.clone(), Arc::new(storage));

        let user = service
            .register_ngo(ngo_payload("hands", "hands@example.com", "R-9"))
            .await
            .unwrap();
        let mut ngo = store.find_ngo_by_user(user.id).await.unwrap().unwrap();
        ngo.approve(Utc::now());
        store.update_ngo(&ngo).await.unwrap();

        let form = NgoProfileForm {
            organization_name: "Helping Hands".into(),
            website: String::new(),
            description: "We help more".into(),
            focus_areas: "Food".into(),
            email: "hands@example.com".into(),
            phone: "555".into(),
            address: "1 Main".into(),
            city: "Town".into(),
            country: "Land".into(),
        };
        let document = UploadedFile {
            file_name: "proof.pdf".into(),
            content_type: None,
            bytes: bytes::Bytes::from_static(b"%PDF-1.4"),
        };
        let reverify = service
            .update_ngo_profile(&user, form, None, Some(document))
            .await
            .unwrap();

        assert!(reverify);
        let ngo = store.find_ngo_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(ngo.status, NgoStatus::Pending);
        assert_eq!(
            ngo.verification_document.as_deref(),
            Some("ngo_documents/doc.pdf")
        );
        assert_eq!(ngo.registration_number, "R-9");
    }

    #[tokio::test]
    async fn duplicate_registration_number_is_refused() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let service = AccountService::new(store, Arc::new(MockFileStorage::new()));
        service
            .register_ngo(ngo_payload("one", "one@example.com", "R-1"))
            .await
            .unwrap();
        let err = service
            .register_ngo(ngo_payload("two", "two@example.com", "R-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let service = AccountService::new(store.clone(), Arc::new(MockFileStorage::new()));
        assert!(service.ensure_admin("root", "root@example.com", "pw-12345").await.unwrap());
        assert!(!service.ensure_admin("root", "root@example.com", "pw-12345").await.unwrap());
        assert_eq!(store.count_users(Some(UserRole::Admin)).await.unwrap(), 1);
    }
}
