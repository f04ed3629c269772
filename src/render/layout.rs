use chrono::NaiveDate;

use super::fonts::{FontFamily, FontWeight};
use super::format::{best_scores, title_case, BestScores};
use crate::models::profile::CandidateRecord;
use crate::utils::time::{format_day_month_year, format_long_date};

pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;

/// CSS pixels per millimetre at 96 DPI.
pub const PX_PER_MM: f32 = 3.78;
/// Supersampling factor applied to the whole sheet.
pub const RENDER_SCALE: f32 = 2.0;
/// The template's printable area sits 10 mm higher than the nominal coordinates.
pub const VERTICAL_OFFSET_MM: f32 = -10.0;

pub const INSTITUTION_LABEL: &str = "NPSN:";
pub const INSTITUTION_CODE: &str = "K9999499";
pub const SCORE_RANGE: &str = "271-677";

pub fn mm_to_px(mm: f32) -> f32 {
    mm * PX_PER_MM * RENDER_SCALE
}

/// Pixel size of the rasterised sheet (2245 x 1588).
pub fn canvas_size() -> (u32, u32) {
    (
        mm_to_px(PAGE_WIDTH_MM).round() as u32,
        mm_to_px(PAGE_HEIGHT_MM).round() as u32,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub family: FontFamily,
    pub size_mm: f32,
    pub weight: FontWeight,
    pub underline: bool,
}

impl TextStyle {
    const fn new(family: FontFamily, size_mm: f32, weight: FontWeight) -> Self {
        Self {
            family,
            size_mm,
            weight,
            underline: false,
        }
    }
}

const SMALL: TextStyle = TextStyle::new(FontFamily::TimesCondensed, 3.5, FontWeight::Regular);
const REGISTRATION: TextStyle =
    TextStyle::new(FontFamily::TimesCondensed, 3.2, FontWeight::Regular);
const INSTITUTION: TextStyle = TextStyle::new(FontFamily::TimesCondensed, 3.1, FontWeight::Regular);
const NAME: TextStyle = TextStyle {
    underline: true,
    ..TextStyle::new(FontFamily::Garamond, 5.6, FontWeight::Bold)
};
const SCORE_VALUE: TextStyle =
    TextStyle::new(FontFamily::TimesNewRomanMtCondensed, 4.1, FontWeight::Bold);
const SCORE_TOTAL: TextStyle =
    TextStyle::new(FontFamily::IbmPlexSansCondensed, 4.1, FontWeight::Bold);
const SCORE_RANGE_STYLE: TextStyle =
    TextStyle::new(FontFamily::IbmPlexSansCondensed, 4.1, FontWeight::Regular);
const BIRTH: TextStyle =
    TextStyle::new(FontFamily::TimesNewRomanMtCondensed, 4.3, FontWeight::Regular);
const PRINT_STAMP: TextStyle =
    TextStyle::new(FontFamily::TimesNewRomanMtCondensed, 3.7, FontWeight::Regular);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Expiry,
    Registration,
    InstitutionCode,
    Name,
    BirthPlaceDate,
    ExamCompletion,
    Listening,
    Structure,
    Reading,
    Total,
    ScoreRange,
    PrintStamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `x` is the left edge of the text.
    Start,
    /// `x` is the horizontal centre of the text.
    Center,
}

#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub field: Field,
    pub x_mm: f32,
    pub y_mm: f32,
    pub anchor: Anchor,
    pub style: TextStyle,
}

const fn at(field: Field, x_mm: f32, y_mm: f32, style: TextStyle) -> Placement {
    Placement {
        field,
        x_mm,
        y_mm,
        anchor: Anchor::Start,
        style,
    }
}

/// Absolute positions on the template, in millimetres before the vertical offset.
pub const PLACEMENTS: [Placement; 12] = [
    at(Field::Expiry, 32.0, 84.0, SMALL),
    at(Field::Registration, 232.0, 81.0, REGISTRATION),
    at(Field::InstitutionCode, 232.0, 87.0, INSTITUTION),
    Placement {
        anchor: Anchor::Center,
        ..at(Field::Name, 148.5, 98.0, NAME)
    },
    at(Field::BirthPlaceDate, 133.0, 105.0, BIRTH),
    at(Field::ExamCompletion, 133.0, 111.0, BIRTH),
    at(Field::Listening, 150.0, 130.2, SCORE_VALUE),
    at(Field::Structure, 150.0, 136.2, SCORE_VALUE),
    at(Field::Reading, 150.0, 142.1, SCORE_VALUE),
    at(Field::Total, 150.0, 147.2, SCORE_TOTAL),
    at(Field::ScoreRange, 133.0, 153.2, SCORE_RANGE_STYLE),
    at(Field::PrintStamp, 146.5, 159.0, PRINT_STAMP),
];

pub const QR_X_MM: f32 = 33.0;
pub const QR_Y_MM: f32 = 140.0;
pub const QR_SIZE_MM: f32 = 30.0;

/// A piece of text sharing one line. `weight` overrides the overlay style when set.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub weight: Option<FontWeight>,
}

impl TextRun {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub field: Field,
    pub x_mm: f32,
    pub top_mm: f32,
    pub anchor: Anchor,
    pub style: TextStyle,
    pub runs: Vec<TextRun>,
}

impl TextOverlay {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrOverlay {
    pub payload: String,
    pub x_mm: f32,
    pub top_mm: f32,
    pub size_mm: f32,
}

#[derive(Debug, Clone)]
pub struct CertificateLayout {
    pub best: BestScores,
    pub texts: Vec<TextOverlay>,
    pub qr: QrOverlay,
}

impl CertificateLayout {
    /// Resolves every field on the sheet for `record`. `issued_on` is the print stamp date.
    pub fn compose(
        record: &CandidateRecord,
        issued_on: NaiveDate,
        validation_url: String,
        print_location: &str,
    ) -> Self {
        let best = best_scores(record);
        let long = |d: Option<NaiveDate>| d.map(format_long_date).unwrap_or_default();

        let texts = PLACEMENTS
            .iter()
            .map(|p| {
                let runs = match p.field {
                    Field::Expiry => vec![TextRun::plain(long(record.effective_expiry()))],
                    Field::Registration => vec![TextRun::plain(format!(
                        "{}/{}",
                        record
                            .nomor_registrasi
                            .map(|n| n.to_string())
                            .unwrap_or_default(),
                        record
                            .tanggal_selesai_ujian
                            .map(format_day_month_year)
                            .unwrap_or_default()
                    ))],
                    Field::InstitutionCode => vec![
                        TextRun {
                            text: INSTITUTION_LABEL.to_string(),
                            weight: Some(FontWeight::Bold),
                        },
                        TextRun::plain(format!(" {}", INSTITUTION_CODE)),
                    ],
                    Field::Name => vec![TextRun::plain(record.nama.to_uppercase())],
                    Field::BirthPlaceDate => vec![TextRun::plain(format!(
                        "{}, {}",
                        title_case(record.tempat_lahir.as_deref().unwrap_or_default()),
                        long(record.tanggal_lahir)
                    ))],
                    Field::ExamCompletion => {
                        vec![TextRun::plain(long(record.tanggal_selesai_ujian))]
                    }
                    Field::Listening => vec![TextRun::plain(format!(": {}", best.listening))],
                    Field::Structure => vec![TextRun::plain(format!(": {}", best.structure))],
                    Field::Reading => vec![TextRun::plain(format!(": {}", best.reading))],
                    Field::Total => vec![TextRun::plain(format!(": {}", best.total_display()))],
                    Field::ScoreRange => vec![TextRun::plain(format!(": {}", SCORE_RANGE))],
                    Field::PrintStamp => vec![TextRun::plain(format!(
                        "{}, {}",
                        print_location,
                        format_long_date(issued_on)
                    ))],
                };

                TextOverlay {
                    field: p.field,
                    x_mm: p.x_mm,
                    top_mm: p.y_mm + VERTICAL_OFFSET_MM,
                    anchor: p.anchor,
                    style: p.style,
                    runs,
                }
            })
            .collect();

        Self {
            best,
            texts,
            qr: QrOverlay {
                payload: validation_url,
                x_mm: QR_X_MM,
                top_mm: QR_Y_MM + VERTICAL_OFFSET_MM,
                size_mm: QR_SIZE_MM,
            },
        }
    }

    pub fn text(&self, field: Field) -> Option<String> {
        self.texts
            .iter()
            .find(|t| t.field == field)
            .map(TextOverlay::text)
    }
}
