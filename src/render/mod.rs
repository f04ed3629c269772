//! Certificate and barcode rendering.
//!
//! The certificate is a fixed A4-landscape sheet: a background template with
//! text and a QR code drawn at absolute millimetre positions. Everything here
//! is synchronous and owns its buffers; callers run it on a blocking thread.

pub mod canvas;
pub mod certificate;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod qr;

pub use certificate::{
    render_barcode, render_certificate, Artifact, BarcodeArtifact, CertificateArtifacts,
    RenderAssets, RenderSettings,
};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load {asset}: {reason}")]
    AssetLoad { asset: String, reason: String },

    #[error("failed to encode {0}")]
    Encode(String),
}

impl RenderError {
    pub fn asset(asset: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        RenderError::AssetLoad {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }
}
