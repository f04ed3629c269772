use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::render::{Artifact, BarcodeArtifact, CertificateArtifacts};
use crate::services::certificate_service::PrintOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDto {
    pub filename: String,
    pub content_type: String,
    /// Base64 (standard alphabet, padded).
    pub data: String,
}

impl From<Artifact> for ArtifactDto {
    fn from(artifact: Artifact) -> Self {
        Self {
            filename: artifact.filename,
            content_type: artifact.content_type.to_string(),
            data: STANDARD.encode(artifact.bytes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateResponse {
    pub pdf: ArtifactDto,
    pub png: ArtifactDto,
}

impl From<CertificateArtifacts> for CertificateResponse {
    fn from(artifacts: CertificateArtifacts) -> Self {
        Self {
            pdf: artifacts.pdf.into(),
            png: artifacts.png.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeResponse {
    pub png: ArtifactDto,
}

impl From<BarcodeArtifact> for BarcodeResponse {
    fn from(artifact: BarcodeArtifact) -> Self {
        Self {
            png: artifact.png.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrintResponse {
    Certificate(CertificateResponse),
    Barcode(BarcodeResponse),
}

impl From<PrintOutcome> for PrintResponse {
    fn from(outcome: PrintOutcome) -> Self {
        match outcome {
            PrintOutcome::Certificate(a) => PrintResponse::Certificate(a.into()),
            PrintOutcome::Barcode(b) => PrintResponse::Barcode(b.into()),
        }
    }
}
