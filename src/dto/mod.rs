pub mod certificate_dto;
pub mod profile_dto;
