use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::profile::{CandidateRecord, ProfilePatch, ProfileRow, ATTEMPT_COLUMNS};

const PROFILE_COLUMNS: &str = r#"
    id, created_at, nama, email, nomor_registrasi, nomor_whatsapp, tempat_lahir, tanggal_lahir,
    score_listening, score_structure, score_reading, total_score,
    score_listening2, score_structure2, score_reading2, total_score2,
    score_listening3, score_structure3, score_reading3, total_score3,
    score_listening4, score_structure4, score_reading4, total_score4,
    tanggal_selesai_ujian, tanggal_cetak_sertifikat, expired_date
"#;

/// Read and partial-update access to candidate profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Option<CandidateRecord>>;

    /// Returns the updated record, or `None` when no profile has this id.
    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<Option<CandidateRecord>>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, id: &str) -> Result<Option<CandidateRecord>> {
        // Compared as text: an id that is not a UUID is simply not found.
        let sql = format!("SELECT {} FROM profile WHERE id::text = $1", PROFILE_COLUMNS);
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CandidateRecord::from))
    }

    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<Option<CandidateRecord>> {
        if patch.is_empty() {
            return Err(Error::BadRequest("No fields to update".to_string()));
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE profile SET ");
        let mut set = qb.separated(", ");

        if let Some(v) = &patch.nama {
            set.push("nama = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.email {
            set.push("email = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.nomor_whatsapp {
            set.push("nomor_whatsapp = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.tempat_lahir {
            set.push("tempat_lahir = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = patch.tanggal_lahir {
            set.push("tanggal_lahir = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.nomor_registrasi {
            set.push("nomor_registrasi = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.tanggal_selesai_ujian {
            set.push("tanggal_selesai_ujian = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.tanggal_cetak_sertifikat {
            set.push("tanggal_cetak_sertifikat = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.expired_date {
            set.push("expired_date = ").push_bind_unseparated(v);
        }

        for update in &patch.attempts {
            let Some(columns) = ATTEMPT_COLUMNS.get(update.slot) else {
                return Err(Error::BadRequest(format!(
                    "Attempt slot {} does not exist",
                    update.slot + 1
                )));
            };
            let scores = &update.scores;
            if let Some(v) = scores.listening {
                set.push(format!("{} = ", columns.listening)).push_bind_unseparated(v);
            }
            if let Some(v) = scores.structure {
                set.push(format!("{} = ", columns.structure)).push_bind_unseparated(v);
            }
            if let Some(v) = scores.reading {
                set.push(format!("{} = ", columns.reading)).push_bind_unseparated(v);
            }
            if let Some(v) = scores.total_score {
                set.push(format!("{} = ", columns.total_score)).push_bind_unseparated(v);
            }
        }

        qb.push(" WHERE id::text = ").push_bind(id.to_string());
        qb.push(" RETURNING ").push(PROFILE_COLUMNS);

        let row = qb
            .build_query_as::<ProfileRow>()
            .fetch_optional(&self.pool)
            .await?;

        if row.is_some() {
            tracing::info!(profile_id = %id, "Profile updated");
        }
        Ok(row.map(CandidateRecord::from))
    }
}

/// Profiles held in process memory. Backs the HTTP tests and offline previews.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, CandidateRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = CandidateRecord>) -> Self {
        Self {
            profiles: RwLock::new(profiles.into_iter().map(|p| (p.id.clone(), p)).collect()),
        }
    }

    pub async fn insert(&self, record: CandidateRecord) {
        self.profiles.write().await.insert(record.id.clone(), record);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn fetch(&self, id: &str) -> Result<Option<CandidateRecord>> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<Option<CandidateRecord>> {
        if patch.is_empty() {
            return Err(Error::BadRequest("No fields to update".to_string()));
        }
        if let Some(bad) = patch.attempts.iter().find(|a| a.slot >= ATTEMPT_COLUMNS.len()) {
            return Err(Error::BadRequest(format!(
                "Attempt slot {} does not exist",
                bad.slot + 1
            )));
        }

        let mut profiles = self.profiles.write().await;
        Ok(profiles.get_mut(id).map(|record| {
            record.apply(patch);
            record.clone()
        }))
    }
}
