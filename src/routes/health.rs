use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let fonts = state.certificate_service.font_faces();
    let background = state.certificate_service.background_available();
    let body = json!({
        "status": "ok",
        "assets": {
            "font_faces": fonts,
            "background": background,
            "ready": fonts > 0 && background,
        },
        "render_in_progress": state.render_gate.is_busy(),
    });
    (StatusCode::OK, Json(body))
}
