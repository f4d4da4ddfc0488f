use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::store::{EventFilter, EventOrder, NgoFilter, Store, UserFilter};
use crate::dto::admin_dto::DashboardStats;
use crate::error::Result;
use crate::models::{event::EventStatus, ngo::NgoStatus, user::UserRole};

const RECENT: usize = 5;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
        let upcoming = EventFilter {
            status: Some(EventStatus::Published),
            starting_from: Some(now),
            order: EventOrder::SoonestFirst,
            ..Default::default()
        };

        let mut recent_volunteers = self
            .store
            .list_users(&UserFilter {
                role: Some(UserRole::Volunteer),
                search: None,
            })
            .await?;
        recent_volunteers.truncate(RECENT);
        let mut recent_ngos = self.store.list_ngos(&NgoFilter::default()).await?;
        recent_ngos.truncate(RECENT);

        Ok(DashboardStats {
            total_volunteers: self.store.count_users(Some(UserRole::Volunteer)).await?,
            total_ngos: self.store.count_ngos(None).await?,
            approved_ngos: self.store.count_ngos(Some(NgoStatus::Approved)).await?,
            pending_ngos: self.store.count_ngos(Some(NgoStatus::Pending)).await?,
            total_events: self.store.count_events(&EventFilter::default()).await?,
            upcoming_events: self.store.count_events(&upcoming).await?,
            total_hours: self.store.total_volunteer_hours().await?,
            recent_volunteers,
            recent_ngos,
            upcoming_events_list: self
                .store
                .list_events(&EventFilter {
                    limit: Some(RECENT as i64),
                    ..upcoming
                })
                .await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::{EventRepository, UserRepository};
    use crate::database::MemoryStore;
    use crate::models::{
        event::Event,
        ngo::Ngo,
        user::User,
        volunteer_profile::VolunteerProfile,
    };
    use chrono::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn counts_only_published_future_events_as_upcoming() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();

        let volunteer = User::new("v".into(), "v@example.com".into(), "x".into(), UserRole::Volunteer);
        let mut profile = VolunteerProfile::new(volunteer.id, String::new(), None);
        profile.hours_completed = 12;
        store.insert_volunteer_account(&volunteer, &profile).await.unwrap();

        let owner = User::new("o".into(), "o@example.com".into(), "x".into(), UserRole::Ngo);
        let ngo = Ngo {
            id: Uuid::new_v4(),
            user_id: owner.id,
            organization_name: "Org".into(),
            registration_number: "O-1".into(),
            description: String::new(),
            logo: None,
            website: String::new(),
            phone: String::new(),
            email: "o@example.com".into(),
            address: String::new(),
            city: String::new(),
            country: String::new(),
            focus_areas: String::new(),
            verification_document: None,
            status: NgoStatus::Pending,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_ngo_account(&owner, &ngo).await.unwrap();

        for (offset, status) in [
            (Duration::days(2), EventStatus::Published),
            (Duration::days(1), EventStatus::Published),
            (Duration::days(3), EventStatus::Ongoing),
            (-Duration::days(1), EventStatus::Published),
        ] {
            store
                .insert_event(&Event {
                    id: Uuid::new_v4(),
                    ngo_id: ngo.id,
                    title: format!("in {}", offset.num_days()),
                    description: String::new(),
                    image: None,
                    date: now + offset,
                    location: String::new(),
                    required_skills: String::new(),
                    max_volunteers: 5,
                    status,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        let stats = DashboardService::new(store).stats(now).await.unwrap();
        assert_eq!(stats.total_volunteers, 1);
        assert_eq!((stats.total_ngos, stats.pending_ngos, stats.approved_ngos), (1, 1, 0));
        assert_eq!((stats.total_events, stats.upcoming_events), (4, 2));
        assert_eq!(stats.total_hours, 12);
        assert_eq!(stats.upcoming_events_list[0].title, "in 1");
    }
}
