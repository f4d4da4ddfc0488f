pub mod account_dto;
pub mod admin_dto;
pub mod certificate_dto;
pub mod event_dto;
pub mod flash;
