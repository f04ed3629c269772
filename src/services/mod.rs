pub mod certificate_service;
pub mod export_service;
pub mod profile_service;
