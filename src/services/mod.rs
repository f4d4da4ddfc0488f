pub mod account_service;
pub mod certificate_service;
pub mod dashboard_service;
pub mod event_service;
pub mod ngo_service;
pub mod registration_service;
pub mod settings_service;
pub mod storage_service;
