use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::profile::CandidateRecord;

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

fn missing(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Checks a profile before any rendering is attempted. Every problem is reported, not just the first.
pub fn validate_for_certificate(record: &CandidateRecord) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if record.nama.trim().is_empty() {
        errors.add("nama", missing("required", "Name is required"));
    }
    if record
        .tempat_lahir
        .as_deref()
        .map_or(true, |p| p.trim().is_empty())
    {
        errors.add("tempat_lahir", missing("required", "Birth place is required"));
    }
    if record.tanggal_lahir.is_none() {
        errors.add("tanggal_lahir", missing("required", "Birth date is required"));
    }
    if !record.attempts.iter().any(|a| a.has_score()) {
        errors.add(
            "attempts",
            missing("no_score", "At least one exam attempt must have a total score"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
