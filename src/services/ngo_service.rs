use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::store::{EventFilter, NgoFilter, Store};
use crate::dto::admin_dto::{NgoApprovalsResponse, NgoDetailResponse, NgoListResponse};
use crate::error::{Error, Result};
use crate::models::ngo::{Ngo, NgoStatus};
use crate::services::event_service::non_empty;

/// Admin side of the NGO verification workflow.
#[derive(Clone)]
pub struct NgoService {
    store: Arc<dyn Store>,
}

impl NgoService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn find(&self, ngo_id: Uuid) -> Result<Ngo> {
        self.store
            .find_ngo(ngo_id)
            .await?
            .ok_or_else(|| Error::NotFound("NGO not found".into()))
    }

    /// `status` is one of the NGO statuses or `all`; pending when omitted.
    pub async fn approvals(&self, status: Option<String>) -> Result<NgoApprovalsResponse> {
        let status_filter = non_empty(status).unwrap_or_else(|| "pending".to_string());
        let status = match status_filter.as_str() {
            "all" => None,
            other => Some(other.parse::<NgoStatus>()?),
        };
        let ngos = self
            .store
            .list_ngos(&NgoFilter {
                status,
                search: None,
            })
            .await?;

        Ok(NgoApprovalsResponse {
            ngos,
            status_filter,
            pending_count: self.store.count_ngos(Some(NgoStatus::Pending)).await?,
            approved_count: self.store.count_ngos(Some(NgoStatus::Approved)).await?,
            rejected_count: self.store.count_ngos(Some(NgoStatus::Rejected)).await?,
            total_count: self.store.count_ngos(None).await?,
        })
    }

    pub async fn approve(&self, ngo_id: Uuid) -> Result<Ngo> {
        let mut ngo = self.find(ngo_id).await?;
        let previous = ngo.status;
        ngo.approve(Utc::now());
        self.store.update_ngo(&ngo).await?;
        tracing::info!(ngo_id = %ngo.id, from = %previous, "ngo approved");
        Ok(ngo)
    }

    pub async fn reject(&self, ngo_id: Uuid) -> Result<Ngo> {
        let mut ngo = self.find(ngo_id).await?;
        let previous = ngo.status;
        ngo.reject(Utc::now());
        self.store.update_ngo(&ngo).await?;
        tracing::info!(ngo_id = %ngo.id, from = %previous, "ngo rejected");
        Ok(ngo)
    }

    pub async fn detail(&self, ngo_id: Uuid) -> Result<NgoDetailResponse> {
        let ngo = self.find(ngo_id).await?;
        let events = self
            .store
            .list_events(&EventFilter {
                ngo_id: Some(ngo.id),
                ..Default::default()
            })
            .await?;
        Ok(NgoDetailResponse { ngo, events })
    }

    pub async fn list(&self, search: Option<String>) -> Result<NgoListResponse> {
        let search = non_empty(search);
        let ngos = self
            .store
            .list_ngos(&NgoFilter {
                status: None,
                search: search.clone(),
            })
            .await?;
        Ok(NgoListResponse {
            total_ngos: ngos.len(),
            ngos,
            search_query: search.unwrap_or_default(),
            approved_ngos: self.store.count_ngos(Some(NgoStatus::Approved)).await?,
        })
    }

    /// Removes the NGO through its owning account; returns the organization name.
    pub async fn delete(&self, ngo_id: Uuid) -> Result<String> {
        let ngo = self.find(ngo_id).await?;
        self.store.delete_user(ngo.user_id).await?;
        tracing::info!(ngo_id = %ngo.id, user_id = %ngo.user_id, "ngo deleted");
        Ok(ngo.organization_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::{NgoRepository, UserRepository};
    use crate::database::MemoryStore;
    use crate::models::user::{User, UserRole};

    async fn seed(store: &MemoryStore, name: &str, number: &str) -> Ngo {
        let user = User::new(
            name.to_lowercase(),
            format!("{}@example.com", name.to_lowercase()),
            "x".into(),
            UserRole::Ngo,
        );
        let now = Utc::now();
        let ngo = Ngo {
            id: Uuid::new_v4(),
            user_id: user.id,
            organization_name: name.into(),
            registration_number: number.into(),
            description: String::new(),
            logo: None,
            website: String::new(),
            phone: String::new(),
            email: user.email.clone(),
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
        store.insert_ngo_account(&user, &ngo).await.unwrap();
        ngo
    }

    #[tokio::test]
    async fn approval_queue_moves_ngos_between_tabs() {
        let store = Arc::new(MemoryStore::new());
        let first = seed(&store, "Alpha", "A-1").await;
        seed(&store, "Beta", "B-1").await;
        let service = NgoService::new(store);

        let queue = service.approvals(None).await.unwrap();
        assert_eq!((queue.status_filter.as_str(), queue.ngos.len()), ("pending", 2));

        let approved = service.approve(first.id).await.unwrap();
        assert!(approved.approved_at.is_some());

        let queue = service.approvals(Some("approved".into())).await.unwrap();
        assert_eq!(queue.ngos.len(), 1);
        assert_eq!((queue.pending_count, queue.approved_count, queue.total_count), (1, 1, 2));

        let rejected = service.reject(first.id).await.unwrap();
        assert_eq!(rejected.status, NgoStatus::Rejected);
        assert!(rejected.approved_at.is_none());
        assert_eq!(service.approvals(Some("all".into())).await.unwrap().ngos.len(), 2);
        assert!(service.approvals(Some("archived".into())).await.is_err());
    }

    #[tokio::test]
    async fn deleting_an_ngo_removes_its_account() {
        let store = Arc::new(MemoryStore::new());
        let ngo = seed(&store, "Gamma", "G-1").await;
        let service = NgoService::new(store.clone());

        assert_eq!(service.delete(ngo.id).await.unwrap(), "Gamma");
        assert!(store.find_user(ngo.user_id).await.unwrap().is_none());
        assert!(store.find_ngo(ngo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_searches_registration_numbers() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "Alpha", "XYZ-77").await;
        seed(&store, "Beta", "B-1").await;
        let service = NgoService::new(store);

        let found = service.list(Some("xyz".into())).await.unwrap();
        assert_eq!(found.total_ngos, 1);
        assert_eq!(found.ngos[0].organization_name, "Alpha");
    }
}
