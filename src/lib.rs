pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Store;
use crate::services::{
    account_service::AccountService, certificate_service::CertificateService,
    dashboard_service::DashboardService, event_service::EventService, ngo_service::NgoService,
    registration_service::RegistrationService, settings_service::SettingsService,
    storage_service::FileStorage,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub account_service: AccountService,
    pub ngo_service: NgoService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub certificate_service: CertificateService,
    pub dashboard_service: DashboardService,
    pub settings_service: SettingsService,
}

impl AppState {
    /// Wires every service onto one store and upload backend. Loads the
    /// platform settings row, creating it on first start.
    pub async fn new(
        store: Arc<dyn Store>,
        storage: Arc<dyn FileStorage>,
        config: Arc<Config>,
    ) -> crate::error::Result<Self> {
        let settings_service = SettingsService::load(store.clone()).await?;

        Ok(Self {
            account_service: AccountService::new(store.clone(), storage.clone()),
            ngo_service: NgoService::new(store.clone()),
            event_service: EventService::new(store.clone(), storage.clone()),
            registration_service: RegistrationService::new(store.clone()),
            certificate_service: CertificateService::new(store.clone(), storage),
            dashboard_service: DashboardService::new(store),
            settings_service,
            config,
        })
    }
}
