use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::certificate_dto::{CertificateResponse, PrintResponse},
    error::Result,
    middleware::session::Session,
    render::Artifact,
    AppState,
};

/// `attachment` disposition carrying the filename exactly as generated. Only
/// the transport encoding changes: an ASCII fallback plus the RFC 5987 form.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded: String = url::form_urlencoded::byte_serialize(filename.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A");
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

fn download(artifact: Artifact) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&artifact.filename),
            ),
        ],
        artifact.bytes,
    )
}

#[axum::debug_handler]
pub async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let artifacts = state.certificate_service.certificate(&id).await?;
    Ok(Json(CertificateResponse::from(artifacts)))
}

#[axum::debug_handler]
pub async fn download_certificate_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let artifacts = state.certificate_service.certificate(&id).await?;
    Ok(download(artifacts.pdf))
}

#[axum::debug_handler]
pub async fn download_certificate_png(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let artifacts = state.certificate_service.certificate(&id).await?;
    Ok(download(artifacts.png))
}

#[axum::debug_handler]
pub async fn download_barcode(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let barcode = state.certificate_service.barcode(&id).await?;
    Ok(download(barcode.png))
}

#[axum::debug_handler]
pub async fn print(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let outcome = state.certificate_service.print(&session, &id).await?;
    Ok(Json(PrintResponse::from(outcome)))
}
