use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::error::{Error, Result};
use crate::middleware::session::{OperatorRole, Session};
use crate::models::profile::CandidateRecord;
use crate::render::fonts::FontBook;
use crate::render::{
    render_barcode, render_certificate, BarcodeArtifact, CertificateArtifacts, RenderAssets,
    RenderError, RenderSettings,
};
use crate::services::profile_service::ProfileStore;
use crate::utils::time::today;
use crate::utils::validation::validate_for_certificate;

/// What a print request produced, depending on who asked.
#[derive(Debug, Clone)]
pub enum PrintOutcome {
    Certificate(CertificateArtifacts),
    Barcode(BarcodeArtifact),
}

#[derive(Clone)]
pub struct CertificateService {
    store: Arc<dyn ProfileStore>,
    fonts: Arc<FontBook>,
    background_path: PathBuf,
    settings: RenderSettings,
}

impl CertificateService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        fonts: Arc<FontBook>,
        background_path: PathBuf,
        settings: RenderSettings,
    ) -> Self {
        Self {
            store,
            fonts,
            background_path,
            settings,
        }
    }

    pub fn font_faces(&self) -> usize {
        self.fonts.len()
    }

    pub fn background_available(&self) -> bool {
        self.background_path.is_file()
    }

    async fn fetch(&self, id: &str) -> Result<CandidateRecord> {
        self.store
            .fetch(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Profile {} not found", id)))
    }

    async fn load_background(&self) -> Result<RgbaImage> {
        let asset = self.background_path.display().to_string();
        let bytes = tokio::fs::read(&self.background_path)
            .await
            .map_err(|e| RenderError::asset(asset.clone(), e))?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| RenderError::asset(asset, e))?;
        Ok(decoded.into_rgba8())
    }

    /// Validates the profile, then renders the certificate as PDF and PNG.
    /// Nothing is drawn when validation fails.
    pub async fn certificate(&self, id: &str) -> Result<CertificateArtifacts> {
        let record = self.fetch(id).await?;
        if let Err(errors) = validate_for_certificate(&record) {
            tracing::warn!(profile_id = %id, errors = %errors, "Profile not eligible for certificate");
            return Err(Error::Validation(errors));
        }

        let background = self.load_background().await?;
        let fonts = self.fonts.clone();
        let settings = self.settings.clone();
        let issued_on = today();

        tracing::info!(profile_id = %id, "Rendering certificate");
        let artifacts = tokio::task::spawn_blocking(move || {
            let assets = RenderAssets {
                background: &background,
                fonts: &fonts,
            };
            render_certificate(&record, &assets, issued_on, &settings)
        })
        .await
        .map_err(|e| Error::Internal(format!("Render task failed: {}", e)))??;

        tracing::info!(
            profile_id = %id,
            pdf_bytes = artifacts.pdf.bytes.len(),
            png_bytes = artifacts.png.bytes.len(),
            "Certificate rendered"
        );
        Ok(artifacts)
    }

    /// QR label for the profile's validation page.
    pub async fn barcode(&self, id: &str) -> Result<BarcodeArtifact> {
        let record = self.fetch(id).await?;
        let settings = self.settings.clone();

        let artifact = tokio::task::spawn_blocking(move || render_barcode(&record, &settings))
            .await
            .map_err(|e| Error::Internal(format!("Render task failed: {}", e)))??;

        tracing::info!(profile_id = %id, "Barcode rendered");
        Ok(artifact)
    }

    pub async fn print(&self, session: &Session, id: &str) -> Result<PrintOutcome> {
        tracing::info!(profile_id = %id, operator = %session.email, role = ?session.role, "Print requested");
        match session.role {
            OperatorRole::Certificate => self.certificate(id).await.map(PrintOutcome::Certificate),
            OperatorRole::Barcode => self.barcode(id).await.map(PrintOutcome::Barcode),
        }
    }
}
