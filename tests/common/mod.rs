#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use exam_certificate_backend::{
    models::profile::{AttemptScores, CandidateRecord, ATTEMPT_SLOTS},
    render::{
        fonts::{FontBook, FontFamily, FontWeight},
        RenderSettings,
    },
    routes,
    services::profile_service::MemoryProfileStore,
    AppState, StateOptions,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;

pub const JWT_SECRET: &str = "test_secret_key";
pub const VALIDATION_BASE: &str = "https://validation.example";

pub fn token(role: &str) -> String {
    let claims = exam_certificate_backend::middleware::session::Claims {
        sub: format!("{}@example.com", role),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}

pub fn eligible_profile(id: &str) -> CandidateRecord {
    let mut attempts = [AttemptScores::default(); ATTEMPT_SLOTS];
    attempts[0] = AttemptScores {
        listening: Some(52),
        structure: Some(46),
        reading: Some(23),
        total_score: Some(40.3),
    };
    attempts[2] = AttemptScores {
        listening: Some(55),
        structure: Some(56),
        reading: Some(57),
        total_score: Some(56.0),
    };
    CandidateRecord {
        id: id.to_string(),
        nama: "Joy Putri".into(),
        email: "joy@example.com".into(),
        nomor_whatsapp: Some("+628123456789".into()),
        tempat_lahir: Some("MALANG kota".into()),
        tanggal_lahir: NaiveDate::from_ymd_opt(2001, 1, 26),
        nomor_registrasi: Some(9904),
        tanggal_selesai_ujian: NaiveDate::from_ymd_opt(2025, 11, 3),
        tanggal_cetak_sertifikat: NaiveDate::from_ymd_opt(2025, 11, 10),
        expired_date: None,
        attempts,
        created_at: None,
    }
}

pub fn state(profiles: Vec<CandidateRecord>, fonts: FontBook, background: PathBuf) -> AppState {
    AppState::new(
        Arc::new(MemoryProfileStore::with_profiles(profiles)),
        StateOptions {
            jwt_secret: JWT_SECRET.to_string(),
            fonts,
            background_path: background,
            settings: RenderSettings {
                validation_base_url: VALIDATION_BASE.to_string(),
                print_location: "Pare".to_string(),
            },
        },
    )
}

pub fn app(state: AppState) -> Router {
    routes::app(state)
}

pub fn get(uri: &str, role: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(role) = role {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(role)));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn with_json(method: &str, uri: &str, role: &str, body: &JsonValue) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token(role)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn body_bytes(res: Response) -> Vec<u8> {
    to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_json(res: Response) -> JsonValue {
    serde_json::from_slice(&body_bytes(res).await).expect("json body")
}

/// Writes a plain background template into `dir` and returns its path.
pub fn write_background(dir: &Path) -> PathBuf {
    let path = dir.join("background.png");
    image::RgbaImage::from_pixel(297, 210, image::Rgba([245, 240, 225, 255]))
        .save(&path)
        .expect("write background");
    path
}

/// Builds a font directory holding the checked-in fixture face under every
/// file name the renderer looks for, and loads it the way the server does.
pub fn fixture_fonts() -> FontBook {
    let fixture =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts/RobotoMedium.ttf");
    let dir = tempfile::tempdir().expect("font dir");
    for family in FontFamily::ALL {
        for weight in [FontWeight::Regular, FontWeight::Bold] {
            std::fs::copy(&fixture, dir.path().join(family.file_name(weight)))
                .expect("copy fixture font");
        }
    }
    FontBook::load_dir(dir.path())
}
