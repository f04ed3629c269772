use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::profile::{AttemptPatch, AttemptScores, ProfilePatch, ATTEMPT_SLOTS};
use crate::utils::time::plus_years;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttemptUpdate {
    /// 1-based exam sitting.
    #[validate(range(min = 1, max = 4))]
    pub slot: usize,
    #[validate(range(min = 0, max = 999))]
    pub listening: Option<i32>,
    #[validate(range(min = 0, max = 999))]
    pub structure: Option<i32>,
    #[validate(range(min = 0, max = 999))]
    pub reading: Option<i32>,
    #[validate(range(min = 0.0, max = 9999.0))]
    pub total_score: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "distinct_attempt_slots"))]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1))]
    pub nama: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub nomor_whatsapp: Option<String>,
    #[validate(length(min = 1))]
    pub tempat_lahir: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub nomor_registrasi: Option<i64>,
    pub tanggal_selesai_ujian: Option<NaiveDate>,
    pub tanggal_cetak_sertifikat: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub attempts: Vec<AttemptUpdate>,
}

/// Each slot may appear at most once in a single update.
fn distinct_attempt_slots(payload: &UpdateProfilePayload) -> Result<(), ValidationError> {
    let mut seen = [false; ATTEMPT_SLOTS];
    for attempt in &payload.attempts {
        let Some(taken) = attempt.slot.checked_sub(1).and_then(|i| seen.get_mut(i)) else {
            continue;
        };
        if *taken {
            let mut err = ValidationError::new("duplicate_attempt_slot");
            err.message =
                Some(format!("attempt slot {} is listed more than once", attempt.slot).into());
            return Err(err);
        }
        *taken = true;
    }
    Ok(())
}

impl UpdateProfilePayload {
    /// Converts to a store patch. A missing total is derived from the three
    /// sections when all are given, and a print date without an explicit expiry
    /// sets the expiry two years out.
    pub fn into_patch(self) -> ProfilePatch {
        let attempts = self
            .attempts
            .into_iter()
            .map(|a| {
                let mut scores = AttemptScores {
                    listening: a.listening,
                    structure: a.structure,
                    reading: a.reading,
                    total_score: a.total_score,
                };
                if scores.total_score.is_none() {
                    scores.total_score = scores.derived_total();
                }
                AttemptPatch {
                    slot: a.slot.saturating_sub(1),
                    scores,
                }
            })
            .collect();

        let expired_date = self.expired_date.or_else(|| {
            self.tanggal_cetak_sertifikat
                .and_then(|printed| plus_years(printed, 2))
        });

        ProfilePatch {
            nama: self.nama,
            email: self.email,
            nomor_whatsapp: self.nomor_whatsapp,
            tempat_lahir: self.tempat_lahir,
            tanggal_lahir: self.tanggal_lahir,
            nomor_registrasi: self.nomor_registrasi,
            tanggal_selesai_ujian: self.tanggal_selesai_ujian,
            tanggal_cetak_sertifikat: self.tanggal_cetak_sertifikat,
            expired_date,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(slot: usize) -> AttemptUpdate {
        AttemptUpdate {
            slot,
            listening: Some(52),
            structure: Some(46),
            reading: Some(23),
            total_score: None,
        }
    }

    #[test]
    fn total_and_expiry_are_derived() {
        let payload = UpdateProfilePayload {
            tanggal_cetak_sertifikat: NaiveDate::from_ymd_opt(2025, 11, 10),
            attempts: vec![attempt(2)],
            ..Default::default()
        };
        let patch = payload.into_patch();
        assert_eq!(patch.expired_date, NaiveDate::from_ymd_opt(2027, 11, 10));
        assert_eq!(patch.attempts[0].slot, 1);
        assert_eq!(patch.attempts[0].scores.total_score, Some(403.0));
    }

    #[test]
    fn explicit_expiry_wins() {
        let payload = UpdateProfilePayload {
            tanggal_cetak_sertifikat: NaiveDate::from_ymd_opt(2025, 11, 10),
            expired_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..Default::default()
        };
        assert_eq!(
            payload.into_patch().expired_date,
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
    }

    #[test]
    fn out_of_range_slot_fails_validation() {
        let payload = UpdateProfilePayload {
            attempts: vec![attempt(5)],
            ..Default::default()
        };
        assert!(payload.validate().is_err());
        assert!(UpdateProfilePayload {
            attempts: vec![attempt(4)],
            ..Default::default()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn bad_email_fails_validation() {
        let payload = UpdateProfilePayload {
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn repeated_slot_fails_validation() {
        let payload = UpdateProfilePayload {
            attempts: vec![attempt(2), attempt(3), attempt(2)],
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["__all__"][0].code, "duplicate_attempt_slot");

        assert!(UpdateProfilePayload {
            attempts: vec![attempt(1), attempt(2), attempt(3), attempt(4)],
            ..Default::default()
        }
        .validate()
        .is_ok());
    }
}
