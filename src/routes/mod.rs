pub mod certificate;
pub mod health;
pub mod profile;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::middleware::render_gate::render_gate_middleware;
use crate::middleware::session::{require_certificate_role, require_session};
use crate::AppState;

/// Full HTTP surface. Transport layers (tracing, CORS) are added by the binary.
pub fn app(state: AppState) -> Router {
    let certificate_api = Router::new()
        .route(
            "/api/profile/:id/certificate",
            get(certificate::get_certificate),
        )
        .route(
            "/api/profile/:id/certificate/pdf",
            get(certificate::download_certificate_pdf),
        )
        .route(
            "/api/profile/:id/certificate/png",
            get(certificate::download_certificate_png),
        )
        .route_layer(from_fn(require_certificate_role));

    let render_api = Router::new()
        .route("/api/profile/:id/barcode", get(certificate::download_barcode))
        .route("/api/profile/:id/print", post(certificate::print))
        .merge(certificate_api)
        .route_layer(from_fn_with_state(
            state.render_gate.clone(),
            render_gate_middleware,
        ));

    let profile_api = Router::new()
        .route(
            "/api/profile/:id",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .merge(render_api)
        .route_layer(from_fn_with_state(
            state.session_keys.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(profile_api)
        .with_state(state)
}
