use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::store::{
    CertificateFilter, CertificateRepository, EventFilter, EventOrder, EventRepository, NgoFilter,
    NgoRepository, RegistrationFilter, RegistrationRepository, SettingsRepository, UserFilter,
    UserRepository,
};
use crate::error::{Error, Result};
use crate::models::{
    certificate::{Certificate, CertificateAssignment, CertificateStatus},
    event::Event,
    ngo::{Ngo, NgoStatus},
    platform_settings::{PlatformSettings, SETTINGS_ID},
    registration::{ApprovalOutcome, EventRegistration, RegistrationStatus},
    user::{User, UserRole},
    volunteer_profile::VolunteerProfile,
};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, role, is_active, date_joined";

const PROFILE_COLUMNS: &str = "id, user_id, phone, date_of_birth, bio, profile_picture, address, \
     city, country, skills, interests, availability, hours_completed, events_completed, \
     created_at, updated_at";

const NGO_COLUMNS: &str = "id, user_id, organization_name, registration_number, description, \
     logo, website, phone, email, address, city, country, focus_areas, verification_document, \
     status, approved_at, created_at, updated_at";

const EVENT_COLUMNS: &str = "e.id, e.ngo_id, e.title, e.description, e.image, e.date, e.location, \
     e.required_skills, e.max_volunteers, e.status, e.created_at, e.updated_at";

const REGISTRATION_COLUMNS: &str = "id, event_id, volunteer_id, status, applied_at, updated_at";

const CERTIFICATE_COLUMNS: &str =
    "c.id, c.event_id, c.certificate_file, c.status, c.uploaded_at, c.approved_at, c.rejected_at";

const ASSIGNMENT_COLUMNS: &str = "id, certificate_id, volunteer_id, assigned_at";

fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_event_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a EventFilter) {
        builder.push(" WHERE TRUE");
        if let Some(ngo_id) = filter.ngo_id {
            builder.push(" AND e.ngo_id = ").push_bind(ngo_id);
        }
        if let Some(status) = filter.status {
            builder.push(" AND e.status = ").push_bind(status.as_str());
        }
        if let Some(from) = filter.starting_from {
            builder.push(" AND e.date >= ").push_bind(from);
        }
        if let Some(term) = filter.search.as_deref() {
            let pattern = like_pattern(term);
            builder
                .push(" AND (e.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.location ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(term) = filter.search_with_organization.as_deref() {
            let pattern = like_pattern(term);
            builder
                .push(" AND (e.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR n.organization_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_volunteer_account(
        &self,
        user: &User,
        profile: &VolunteerProfile,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.date_joined)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO volunteer_profiles ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
            PROFILE_COLUMNS
        ))
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.phone)
        .bind(profile.date_of_birth)
        .bind(&profile.bio)
        .bind(&profile.profile_picture)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.country)
        .bind(&profile.skills)
        .bind(&profile.interests)
        .bind(&profile.availability)
        .bind(profile.hours_completed)
        .bind(profile.events_completed)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_ngo_account(&self, user: &User, ngo: &Ngo) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.date_joined)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO ngos ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
            NGO_COLUMNS
        ))
        .bind(ngo.id)
        .bind(ngo.user_id)
        .bind(&ngo.organization_name)
        .bind(&ngo.registration_number)
        .bind(&ngo.description)
        .bind(&ngo.logo)
        .bind(&ngo.website)
        .bind(&ngo.phone)
        .bind(&ngo.email)
        .bind(&ngo.address)
        .bind(&ngo.city)
        .bind(&ngo.country)
        .bind(&ngo.focus_areas)
        .bind(&ngo.verification_document)
        .bind(ngo.status.as_str())
        .bind(ngo.approved_at)
        .bind(ngo.created_at)
        .bind(ngo.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, first_name = $3, last_name = $4, password_hash = $5, \
             is_active = $6 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM users WHERE TRUE",
            USER_COLUMNS
        ));
        if let Some(role) = filter.role {
            builder.push(" AND role = ").push_bind(role.as_str());
        }
        if let Some(term) = filter.search.as_deref() {
            let pattern = like_pattern(term);
            builder
                .push(" AND (username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY date_joined DESC");

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn count_users(&self, role: Option<UserRole>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR role = $1)",
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_volunteer_profile(&self, user_id: Uuid) -> Result<Option<VolunteerProfile>> {
        let profile = sqlx::query_as::<_, VolunteerProfile>(&format!(
            "SELECT {} FROM volunteer_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn update_volunteer_profile(&self, profile: &VolunteerProfile) -> Result<()> {
        let result = sqlx::query(
            "UPDATE volunteer_profiles SET phone = $2, date_of_birth = $3, bio = $4, \
             profile_picture = $5, address = $6, city = $7, country = $8, skills = $9, \
             interests = $10, availability = $11, hours_completed = $12, \
             events_completed = $13, updated_at = $14 WHERE user_id = $1",
        )
        .bind(profile.user_id)
        .bind(&profile.phone)
        .bind(profile.date_of_birth)
        .bind(&profile.bio)
        .bind(&profile.profile_picture)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.country)
        .bind(&profile.skills)
        .bind(&profile.interests)
        .bind(&profile.availability)
        .bind(profile.hours_completed)
        .bind(profile.events_completed)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Volunteer profile not found".into()));
        }
        Ok(())
    }

    async fn total_volunteer_hours(&self) -> Result<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(hours_completed), 0)::BIGINT FROM volunteer_profiles")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}

#[async_trait]
impl NgoRepository for PgStore {
    async fn find_ngo(&self, id: Uuid) -> Result<Option<Ngo>> {
        let ngo = sqlx::query_as::<_, Ngo>(&format!(
            "SELECT {} FROM ngos WHERE id = $1",
            NGO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ngo)
    }

    async fn find_ngo_by_user(&self, user_id: Uuid) -> Result<Option<Ngo>> {
        let ngo = sqlx::query_as::<_, Ngo>(&format!(
            "SELECT {} FROM ngos WHERE user_id = $1",
            NGO_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ngo)
    }

    async fn find_ngo_by_registration_number(&self, number: &str) -> Result<Option<Ngo>> {
        let ngo = sqlx::query_as::<_, Ngo>(&format!(
            "SELECT {} FROM ngos WHERE registration_number = $1",
            NGO_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ngo)
    }

    async fn update_ngo(&self, ngo: &Ngo) -> Result<()> {
        let result = sqlx::query(
            "UPDATE ngos SET organization_name = $2, description = $3, logo = $4, website = $5, \
             phone = $6, email = $7, address = $8, city = $9, country = $10, focus_areas = $11, \
             verification_document = $12, status = $13, approved_at = $14, updated_at = $15 \
             WHERE id = $1",
        )
        .bind(ngo.id)
        .bind(&ngo.organization_name)
        .bind(&ngo.description)
        .bind(&ngo.logo)
        .bind(&ngo.website)
        .bind(&ngo.phone)
        .bind(&ngo.email)
        .bind(&ngo.address)
        .bind(&ngo.city)
        .bind(&ngo.country)
        .bind(&ngo.focus_areas)
        .bind(&ngo.verification_document)
        .bind(ngo.status.as_str())
        .bind(ngo.approved_at)
        .bind(ngo.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("NGO not found".into()));
        }
        Ok(())
    }

    async fn list_ngos(&self, filter: &NgoFilter) -> Result<Vec<Ngo>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM ngos WHERE TRUE",
            NGO_COLUMNS
        ));
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(term) = filter.search.as_deref() {
            let pattern = like_pattern(term);
            builder
                .push(" AND (organization_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR registration_number ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY created_at DESC");

        let ngos = builder.build_query_as::<Ngo>().fetch_all(&self.pool).await?;
        Ok(ngos)
    }

    async fn count_ngos(&self, status: Option<NgoStatus>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ngos WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "INSERT INTO events (id, ngo_id, title, description, image, date, location, \
             required_skills, max_volunteers, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(event.id)
        .bind(event.ngo_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.image)
        .bind(event.date)
        .bind(&event.location)
        .bind(&event.required_skills)
        .bind(event.max_volunteers)
        .bind(event.status.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events e WHERE e.id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let result = sqlx::query(
            "UPDATE events SET title = $2, description = $3, image = $4, date = $5, \
             location = $6, required_skills = $7, max_volunteers = $8, status = $9, \
             updated_at = $10 WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.image)
        .bind(event.date)
        .bind(&event.location)
        .bind(&event.required_skills)
        .bind(event.max_volunteers)
        .bind(event.status.as_str())
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM events e JOIN ngos n ON n.id = e.ngo_id",
            EVENT_COLUMNS
        ));
        Self::push_event_filter(&mut builder, filter);
        match filter.order {
            EventOrder::NewestFirst => builder.push(" ORDER BY e.created_at DESC"),
            EventOrder::SoonestFirst => builder.push(" ORDER BY e.date ASC"),
        };
        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let events = builder
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn count_events(&self, filter: &EventFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM events e JOIN ngos n ON n.id = e.ngo_id",
        );
        Self::push_event_filter(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl RegistrationRepository for PgStore {
    async fn insert_registration(&self, registration: &EventRegistration) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO event_registrations ({}) VALUES ($1, $2, $3, $4, $5, $6)",
            REGISTRATION_COLUMNS
        ))
        .bind(registration.id)
        .bind(registration.event_id)
        .bind(registration.volunteer_id)
        .bind(registration.status.as_str())
        .bind(registration.applied_at)
        .bind(registration.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_registration(&self, id: Uuid) -> Result<Option<EventRegistration>> {
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {} FROM event_registrations WHERE id = $1",
            REGISTRATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    async fn find_registration_for(
        &self,
        event_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Option<EventRegistration>> {
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {} FROM event_registrations WHERE event_id = $1 AND volunteer_id = $2",
            REGISTRATION_COLUMNS
        ))
        .bind(event_id)
        .bind(volunteer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<EventRegistration>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM event_registrations WHERE TRUE",
            REGISTRATION_COLUMNS
        ));
        if let Some(event_id) = filter.event_id {
            builder.push(" AND event_id = ").push_bind(event_id);
        }
        if let Some(volunteer_id) = filter.volunteer_id {
            builder.push(" AND volunteer_id = ").push_bind(volunteer_id);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if filter.exclude_withdrawn {
            builder
                .push(" AND status <> ")
                .push_bind(RegistrationStatus::Withdrawn.as_str());
        }
        builder.push(" ORDER BY applied_at DESC");

        let registrations = builder
            .build_query_as::<EventRegistration>()
            .fetch_all(&self.pool)
            .await?;
        Ok(registrations)
    }

    async fn count_registrations(
        &self,
        event_id: Uuid,
        status: RegistrationStatus,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND status = $2",
        )
        .bind(event_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn set_registration_status(&self, id: Uuid, status: RegistrationStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE event_registrations SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Registration not found".into()));
        }
        Ok(())
    }

    async fn approve_registration(&self, id: Uuid) -> Result<ApprovalOutcome> {
        let mut tx = self.pool.begin().await?;

        let event_id: Uuid =
            sqlx::query_scalar("SELECT event_id FROM event_registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| Error::NotFound("Registration not found".into()))?;

        // Row lock on the event serializes concurrent approvals for it.
        let max_volunteers: i32 =
            sqlx::query_scalar("SELECT max_volunteers FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| Error::NotFound("Event not found".into()))?;

        let approved: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND status = $2",
        )
        .bind(event_id)
        .bind(RegistrationStatus::Approved.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if approved >= max_volunteers as i64 {
            tx.rollback().await?;
            return Ok(ApprovalOutcome::EventFull);
        }

        let updated = sqlx::query(
            "UPDATE event_registrations SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(RegistrationStatus::Approved.as_str())
        .bind(RegistrationStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let current: String =
                sqlx::query_scalar("SELECT status FROM event_registrations WHERE id = $1")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;
            return Ok(ApprovalOutcome::NotPending(current.parse()?));
        }

        tx.commit().await?;
        Ok(ApprovalOutcome::Approved)
    }
}

#[async_trait]
impl CertificateRepository for PgStore {
    async fn find_certificate(&self, id: Uuid) -> Result<Option<Certificate>> {
        let certificate = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {} FROM certificates c WHERE c.id = $1",
            CERTIFICATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(certificate)
    }

    async fn find_certificate_for_event(&self, event_id: Uuid) -> Result<Option<Certificate>> {
        let certificate = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {} FROM certificates c WHERE c.event_id = $1",
            CERTIFICATE_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(certificate)
    }

    async fn replace_certificate(&self, certificate: &Certificate) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM certificates WHERE event_id = $1")
            .bind(certificate.event_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO certificates (id, event_id, certificate_file, status, uploaded_at, \
             approved_at, rejected_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(certificate.id)
        .bind(certificate.event_id)
        .bind(&certificate.certificate_file)
        .bind(certificate.status.as_str())
        .bind(certificate.uploaded_at)
        .bind(certificate.approved_at)
        .bind(certificate.rejected_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_certificate(&self, certificate: &Certificate) -> Result<()> {
        let result = sqlx::query(
            "UPDATE certificates SET certificate_file = $2, status = $3, approved_at = $4, \
             rejected_at = $5 WHERE id = $1",
        )
        .bind(certificate.id)
        .bind(&certificate.certificate_file)
        .bind(certificate.status.as_str())
        .bind(certificate.approved_at)
        .bind(certificate.rejected_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Certificate not found".into()));
        }
        Ok(())
    }

    async fn delete_certificate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_certificates(&self, filter: &CertificateFilter) -> Result<Vec<Certificate>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM certificates c \
             JOIN events e ON e.id = c.event_id \
             JOIN ngos n ON n.id = e.ngo_id WHERE TRUE",
            CERTIFICATE_COLUMNS
        ));
        if let Some(status) = filter.status {
            builder.push(" AND c.status = ").push_bind(status.as_str());
        }
        if let Some(term) = filter.search.as_deref() {
            let pattern = like_pattern(term);
            builder
                .push(" AND (e.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR n.organization_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if filter.oldest_first {
            builder.push(" ORDER BY c.uploaded_at ASC");
        } else {
            builder.push(" ORDER BY c.uploaded_at DESC");
        }

        let certificates = builder
            .build_query_as::<Certificate>()
            .fetch_all(&self.pool)
            .await?;
        Ok(certificates)
    }

    async fn count_certificates(&self, status: Option<CertificateStatus>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM certificates WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn insert_assignment(&self, assignment: &CertificateAssignment) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO certificate_assignments ({}) VALUES ($1, $2, $3, $4)",
            ASSIGNMENT_COLUMNS
        ))
        .bind(assignment.id)
        .bind(assignment.certificate_id)
        .bind(assignment.volunteer_id)
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_assignments_for_certificate(
        &self,
        certificate_id: Uuid,
    ) -> Result<Vec<CertificateAssignment>> {
        let assignments = sqlx::query_as::<_, CertificateAssignment>(&format!(
            "SELECT {} FROM certificate_assignments WHERE certificate_id = $1 \
             ORDER BY assigned_at DESC",
            ASSIGNMENT_COLUMNS
        ))
        .bind(certificate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    async fn list_assignments_for_volunteer(
        &self,
        volunteer_id: Uuid,
    ) -> Result<Vec<CertificateAssignment>> {
        let assignments = sqlx::query_as::<_, CertificateAssignment>(&format!(
            "SELECT {} FROM certificate_assignments WHERE volunteer_id = $1 \
             ORDER BY assigned_at DESC",
            ASSIGNMENT_COLUMNS
        ))
        .bind(volunteer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }
}

#[async_trait]
impl SettingsRepository for PgStore {
    async fn load_settings(&self) -> Result<PlatformSettings> {
        sqlx::query("INSERT INTO platform_settings (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(SETTINGS_ID)
            .execute(&self.pool)
            .await?;

        let settings = sqlx::query_as::<_, PlatformSettings>(
            "SELECT * FROM platform_settings WHERE id = $1",
        )
        .bind(SETTINGS_ID)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn save_settings(&self, s: &PlatformSettings) -> Result<PlatformSettings> {
        let saved = sqlx::query_as::<_, PlatformSettings>(
            "INSERT INTO platform_settings (id, site_name, site_tagline, site_description, \
             admin_email, support_email, noreply_email, send_welcome_email, send_approval_emails, \
             send_event_reminders, require_event_approval, max_event_duration, \
             min_volunteers_per_event, max_volunteers_per_event, event_cancellation_hours, \
             auto_complete_events, allow_volunteer_registration, allow_ngo_registration, \
             require_email_verification, min_volunteer_age, require_ngo_verification, \
             auto_approve_verified_ngos, ngo_approval_time, enable_push_notifications, \
             enable_sms_notifications, notify_on_new_event, notify_on_event_update, \
             maintenance_mode, maintenance_message, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
             $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, NOW()) \
             ON CONFLICT (id) DO UPDATE SET site_name = EXCLUDED.site_name, \
             site_tagline = EXCLUDED.site_tagline, site_description = EXCLUDED.site_description, \
             admin_email = EXCLUDED.admin_email, support_email = EXCLUDED.support_email, \
             noreply_email = EXCLUDED.noreply_email, \
             send_welcome_email = EXCLUDED.send_welcome_email, \
             send_approval_emails = EXCLUDED.send_approval_emails, \
             send_event_reminders = EXCLUDED.send_event_reminders, \
             require_event_approval = EXCLUDED.require_event_approval, \
             max_event_duration = EXCLUDED.max_event_duration, \
             min_volunteers_per_event = EXCLUDED.min_volunteers_per_event, \
             max_volunteers_per_event = EXCLUDED.max_volunteers_per_event, \
             event_cancellation_hours = EXCLUDED.event_cancellation_hours, \
             auto_complete_events = EXCLUDED.auto_complete_events, \
             allow_volunteer_registration = EXCLUDED.allow_volunteer_registration, \
             allow_ngo_registration = EXCLUDED.allow_ngo_registration, \
             require_email_verification = EXCLUDED.require_email_verification, \
             min_volunteer_age = EXCLUDED.min_volunteer_age, \
             require_ngo_verification = EXCLUDED.require_ngo_verification, \
             auto_approve_verified_ngos = EXCLUDED.auto_approve_verified_ngos, \
             ngo_approval_time = EXCLUDED.ngo_approval_time, \
             enable_push_notifications = EXCLUDED.enable_push_notifications, \
             enable_sms_notifications = EXCLUDED.enable_sms_notifications, \
             notify_on_new_event = EXCLUDED.notify_on_new_event, \
             notify_on_event_update = EXCLUDED.notify_on_event_update, \
             maintenance_mode = EXCLUDED.maintenance_mode, \
             maintenance_message = EXCLUDED.maintenance_message, \
             updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(SETTINGS_ID)
        .bind(&s.site_name)
        .bind(&s.site_tagline)
        .bind(&s.site_description)
        .bind(&s.admin_email)
        .bind(&s.support_email)
        .bind(&s.noreply_email)
        .bind(s.send_welcome_email)
        .bind(s.send_approval_emails)
        .bind(s.send_event_reminders)
        .bind(s.require_event_approval)
        .bind(s.max_event_duration)
        .bind(s.min_volunteers_per_event)
        .bind(s.max_volunteers_per_event)
        .bind(s.event_cancellation_hours)
        .bind(s.auto_complete_events)
        .bind(s.allow_volunteer_registration)
        .bind(s.allow_ngo_registration)
        .bind(s.require_email_verification)
        .bind(s.min_volunteer_age)
        .bind(s.require_ngo_verification)
        .bind(s.auto_approve_verified_ngos)
        .bind(s.ngo_approval_time)
        .bind(s.enable_push_notifications)
        .bind(s.enable_sms_notifications)
        .bind(s.notify_on_new_event)
        .bind(s.notify_on_event_update)
        .bind(s.maintenance_mode)
        .bind(&s.maintenance_message)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}
