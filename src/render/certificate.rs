use chrono::NaiveDate;
use image::{DynamicImage, GrayImage, RgbaImage};

use super::canvas::RenderTarget;
use super::fonts::FontBook;
use super::layout::{canvas_size, mm_to_px, CertificateLayout};
use super::qr::{module_count, render_qr, validation_url};
use super::RenderError;
use crate::models::profile::CandidateRecord;
use crate::services::export_service::ExportService;

/// Pixels per QR module on the standalone barcode label.
pub const BARCODE_MODULE_PX: u32 = 8;

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub validation_base_url: String,
    pub print_location: String,
}

/// Inputs loaded from disk that a certificate render draws on.
pub struct RenderAssets<'a> {
    pub background: &'a RgbaImage,
    pub fonts: &'a FontBook,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    fn png(filename: String, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            content_type: "image/png",
            bytes,
        }
    }

    fn pdf(filename: String, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            content_type: "application/pdf",
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CertificateArtifacts {
    pub pdf: Artifact,
    pub png: Artifact,
}

#[derive(Debug, Clone)]
pub struct BarcodeArtifact {
    pub png: Artifact,
}

/// Draws the full certificate for `record` and encodes it as PDF and PNG.
///
/// The record must already have passed certificate validation. `issued_on` is
/// the date printed in the stamp line, normally today.
pub fn render_certificate(
    record: &CandidateRecord,
    assets: &RenderAssets<'_>,
    issued_on: NaiveDate,
    settings: &RenderSettings,
) -> Result<CertificateArtifacts, RenderError> {
    let url = validation_url(&settings.validation_base_url, &record.id);
    let layout = CertificateLayout::compose(record, issued_on, url, &settings.print_location);

    let (width, height) = canvas_size();
    let mut target = RenderTarget::new(width, height, assets.background);

    for overlay in &layout.texts {
        target.draw_text(overlay, assets.fonts)?;
    }

    let qr_px = mm_to_px(layout.qr.size_mm).round() as u32;
    let qr = render_qr(&layout.qr.payload, qr_px)?;
    target.draw_qr(&qr, layout.qr.x_mm, layout.qr.top_mm);

    let bitmap = target.into_bitmap();
    let stem = format!("certificate-{}", record.nama);

    let pdf = ExportService::pdf_bytes(&bitmap, &stem)?;
    let png = ExportService::png_bytes(&bitmap)?;

    Ok(CertificateArtifacts {
        pdf: Artifact::pdf(format!("{}.pdf", stem), pdf),
        png: Artifact::png(format!("{}.png", stem), png),
    })
}

/// Standalone QR label pointing at the validation page for `record`.
pub fn render_barcode(
    record: &CandidateRecord,
    settings: &RenderSettings,
) -> Result<BarcodeArtifact, RenderError> {
    let url = validation_url(&settings.validation_base_url, &record.id);
    let size = module_count(&url)? * BARCODE_MODULE_PX;
    let qr: GrayImage = render_qr(&url, size)?;
    let bitmap = DynamicImage::ImageLuma8(qr).into_rgba8();

    Ok(BarcodeArtifact {
        png: Artifact::png(
            format!("barcode-{}.png", record.nama),
            ExportService::png_bytes(&bitmap)?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{AttemptScores, ATTEMPT_SLOTS};
    use crate::render::fonts::{FontFamily, FontWeight};
    use image::Rgba;

    fn record() -> CandidateRecord {
        CandidateRecord {
            id: "abc123".into(),
            nama: "Joy Putri".into(),
            email: "joy@example.com".into(),
            nomor_whatsapp: None,
            tempat_lahir: Some("Malang".into()),
            tanggal_lahir: NaiveDate::from_ymd_opt(2001, 1, 26),
            nomor_registrasi: Some(9904),
            tanggal_selesai_ujian: NaiveDate::from_ymd_opt(2025, 11, 3),
            tanggal_cetak_sertifikat: None,
            expired_date: None,
            attempts: [AttemptScores::default(); ATTEMPT_SLOTS],
            created_at: None,
        }
    }

    fn settings() -> RenderSettings {
        RenderSettings {
            validation_base_url: "https://validation.example".into(),
            print_location: "Pare".into(),
        }
    }

    #[test]
    fn barcode_is_square_png_named_after_candidate() {
        let artifact = render_barcode(&record(), &settings()).unwrap();
        assert_eq!(artifact.png.filename, "barcode-Joy Putri.png");
        assert_eq!(artifact.png.content_type, "image/png");

        let decoded = image::load_from_memory(&artifact.png.bytes).unwrap();
        assert_eq!(decoded.width(), decoded.height());
        assert_eq!(decoded.width() % BARCODE_MODULE_PX, 0);
    }

    fn fixture_fonts() -> FontBook {
        let font = ab_glyph::FontArc::try_from_slice(include_bytes!(
            "../../tests/fixtures/fonts/RobotoMedium.ttf"
        ))
        .unwrap();
        let mut book = FontBook::new();
        book.insert(FontFamily::Garamond, FontWeight::Bold, font);
        book
    }

    #[test]
    fn certificate_draws_name_and_qr_onto_the_sheet() {
        let background = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let fonts = fixture_fonts();
        let assets = RenderAssets {
            background: &background,
            fonts: &fonts,
        };
        let artifacts = render_certificate(
            &record(),
            &assets,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            &settings(),
        )
        .unwrap();
        assert_eq!(artifacts.pdf.filename, "certificate-Joy Putri.pdf");
        assert_eq!(artifacts.pdf.content_type, "application/pdf");
        assert_eq!(artifacts.png.filename, "certificate-Joy Putri.png");

        let sheet = image::load_from_memory(&artifacts.png.bytes)
            .unwrap()
            .into_rgba8();
        assert_eq!(sheet.dimensions(), canvas_size());

        let dark_in = |x0: f32, y0: f32, x1: f32, y1: f32| {
            let (x0, y0) = (mm_to_px(x0) as u32, mm_to_px(y0) as u32);
            let (x1, y1) = (mm_to_px(x1) as u32, mm_to_px(y1) as u32);
            (y0..y1)
                .flat_map(|y| (x0..x1).map(move |x| (x, y)))
                .filter(|&(x, y)| sheet.get_pixel(x, y).0[0] < 128)
                .count()
        };
        // Name line, centred at 148.5 mm with its top at 88 mm.
        assert!(dark_in(110.0, 88.0, 187.0, 96.0) > 0);
        // QR square at (33, 130), 30 mm wide.
        assert!(dark_in(33.0, 130.0, 63.0, 160.0) > 0);
        // Left margin above the QR stays blank.
        assert_eq!(dark_in(2.0, 2.0, 20.0, 20.0), 0);
    }

    #[test]
    fn certificate_without_fonts_fails_with_asset_error() {
        let background = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let fonts = FontBook::new();
        let assets = RenderAssets {
            background: &background,
            fonts: &fonts,
        };
        let err = render_certificate(
            &record(),
            &assets,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            &settings(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
    }
}
