use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::time::plus_years;

/// Number of exam sittings a profile can record.
pub const ATTEMPT_SLOTS: usize = 4;

/// Column names backing one attempt slot in the `profile` table.
#[derive(Debug, Clone, Copy)]
pub struct AttemptColumns {
    pub listening: &'static str,
    pub structure: &'static str,
    pub reading: &'static str,
    pub total_score: &'static str,
}

pub const ATTEMPT_COLUMNS: [AttemptColumns; ATTEMPT_SLOTS] = [
    AttemptColumns {
        listening: "score_listening",
        structure: "score_structure",
        reading: "score_reading",
        total_score: "total_score",
    },
    AttemptColumns {
        listening: "score_listening2",
        structure: "score_structure2",
        reading: "score_reading2",
        total_score: "total_score2",
    },
    AttemptColumns {
        listening: "score_listening3",
        structure: "score_structure3",
        reading: "score_reading3",
        total_score: "total_score3",
    },
    AttemptColumns {
        listening: "score_listening4",
        structure: "score_structure4",
        reading: "score_reading4",
        total_score: "total_score4",
    },
];

/// Flat `profile` row as stored by the admin CRUD layer.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub nama: String,
    pub email: String,
    pub nomor_registrasi: Option<i64>,
    pub nomor_whatsapp: Option<String>,
    pub tempat_lahir: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub score_listening: Option<i32>,
    pub score_structure: Option<i32>,
    pub score_reading: Option<i32>,
    pub total_score: Option<f32>,
    pub score_listening2: Option<i32>,
    pub score_structure2: Option<i32>,
    pub score_reading2: Option<i32>,
    pub total_score2: Option<f32>,
    pub score_listening3: Option<i32>,
    pub score_structure3: Option<i32>,
    pub score_reading3: Option<i32>,
    pub total_score3: Option<f32>,
    pub score_listening4: Option<i32>,
    pub score_structure4: Option<i32>,
    pub score_reading4: Option<i32>,
    pub total_score4: Option<f32>,
    pub tanggal_selesai_ujian: Option<NaiveDate>,
    pub tanggal_cetak_sertifikat: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptScores {
    pub listening: Option<i32>,
    pub structure: Option<i32>,
    pub reading: Option<i32>,
    pub total_score: Option<f32>,
}

impl AttemptScores {
    /// Total as the CRUD forms compute it: the mean of the three sections, times ten, rounded.
    pub fn derived_total(&self) -> Option<f32> {
        let (l, s, r) = (self.listening?, self.structure?, self.reading?);
        let mean = (l + s + r) as f64 / 3.0;
        Some((mean * 10.0).round() as f32)
    }

    pub fn has_score(&self) -> bool {
        self.total_score.unwrap_or(0.0) > 0.0
    }
}

/// Read-only view of a candidate handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub nama: String,
    pub email: String,
    pub nomor_whatsapp: Option<String>,
    pub tempat_lahir: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub nomor_registrasi: Option<i64>,
    pub tanggal_selesai_ujian: Option<NaiveDate>,
    pub tanggal_cetak_sertifikat: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub attempts: [AttemptScores; ATTEMPT_SLOTS],
    pub created_at: Option<DateTime<Utc>>,
}

impl CandidateRecord {
    /// Stored expiry, or two years after the print date when none was entered.
    pub fn effective_expiry(&self) -> Option<NaiveDate> {
        self.expired_date
            .or_else(|| self.tanggal_cetak_sertifikat.and_then(|d| plus_years(d, 2)))
    }

    /// Merges a patch in place. Mirrors the SQL update issued by the database store.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(v) = &patch.nama {
            self.nama = v.clone();
        }
        if let Some(v) = &patch.email {
            self.email = v.clone();
        }
        if let Some(v) = &patch.nomor_whatsapp {
            self.nomor_whatsapp = Some(v.clone());
        }
        if let Some(v) = &patch.tempat_lahir {
            self.tempat_lahir = Some(v.clone());
        }
        if patch.tanggal_lahir.is_some() {
            self.tanggal_lahir = patch.tanggal_lahir;
        }
        if patch.nomor_registrasi.is_some() {
            self.nomor_registrasi = patch.nomor_registrasi;
        }
        if patch.tanggal_selesai_ujian.is_some() {
            self.tanggal_selesai_ujian = patch.tanggal_selesai_ujian;
        }
        if patch.tanggal_cetak_sertifikat.is_some() {
            self.tanggal_cetak_sertifikat = patch.tanggal_cetak_sertifikat;
        }
        if patch.expired_date.is_some() {
            self.expired_date = patch.expired_date;
        }
        for update in &patch.attempts {
            let Some(slot) = self.attempts.get_mut(update.slot) else {
                continue;
            };
            if update.scores.listening.is_some() {
                slot.listening = update.scores.listening;
            }
            if update.scores.structure.is_some() {
                slot.structure = update.scores.structure;
            }
            if update.scores.reading.is_some() {
                slot.reading = update.scores.reading;
            }
            if update.scores.total_score.is_some() {
                slot.total_score = update.scores.total_score;
            }
        }
    }
}

impl From<ProfileRow> for CandidateRecord {
    fn from(row: ProfileRow) -> Self {
        let attempts = [
            AttemptScores {
                listening: row.score_listening,
                structure: row.score_structure,
                reading: row.score_reading,
                total_score: row.total_score,
            },
            AttemptScores {
                listening: row.score_listening2,
                structure: row.score_structure2,
                reading: row.score_reading2,
                total_score: row.total_score2,
            },
            AttemptScores {
                listening: row.score_listening3,
                structure: row.score_structure3,
                reading: row.score_reading3,
                total_score: row.total_score3,
            },
            AttemptScores {
                listening: row.score_listening4,
                structure: row.score_structure4,
                reading: row.score_reading4,
                total_score: row.total_score4,
            },
        ];

        Self {
            id: row.id.to_string(),
            nama: row.nama,
            email: row.email,
            nomor_whatsapp: row.nomor_whatsapp,
            tempat_lahir: row.tempat_lahir,
            tanggal_lahir: row.tanggal_lahir,
            nomor_registrasi: row.nomor_registrasi,
            tanggal_selesai_ujian: row.tanggal_selesai_ujian,
            tanggal_cetak_sertifikat: row.tanggal_cetak_sertifikat,
            expired_date: row.expired_date,
            attempts,
            created_at: row.created_at,
        }
    }
}

/// Score changes for a single attempt slot (0-based).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttemptPatch {
    pub slot: usize,
    pub scores: AttemptScores,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub nama: Option<String>,
    pub email: Option<String>,
    pub nomor_whatsapp: Option<String>,
    pub tempat_lahir: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub nomor_registrasi: Option<i64>,
    pub tanggal_selesai_ujian: Option<NaiveDate>,
    pub tanggal_cetak_sertifikat: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub attempts: Vec<AttemptPatch>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.nama.is_none()
            && self.email.is_none()
            && self.nomor_whatsapp.is_none()
            && self.tempat_lahir.is_none()
            && self.tanggal_lahir.is_none()
            && self.nomor_registrasi.is_none()
            && self.tanggal_selesai_ujian.is_none()
            && self.tanggal_cetak_sertifikat.is_none()
            && self.expired_date.is_none()
            && self.attempts.iter().all(|a| a.scores == AttemptScores::default())
    }
}
