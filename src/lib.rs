pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use crate::middleware::{render_gate::RenderGate, session::SessionKeys};
use crate::render::{fonts::FontBook, RenderSettings};
use crate::services::{certificate_service::CertificateService, profile_service::ProfileStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub certificate_service: CertificateService,
    pub session_keys: SessionKeys,
    pub render_gate: RenderGate,
}

/// Everything `AppState` needs besides the profile store.
pub struct StateOptions {
    pub jwt_secret: String,
    pub fonts: FontBook,
    pub background_path: PathBuf,
    pub settings: RenderSettings,
}

impl StateOptions {
    pub fn from_config(config: &config::Config, fonts: FontBook) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            fonts,
            background_path: config.certificate_background.clone(),
            settings: RenderSettings {
                validation_base_url: config.validation_base_url.clone(),
                print_location: config.print_location.clone(),
            },
        }
    }
}

impl AppState {
    pub fn new(store: Arc<dyn ProfileStore>, options: StateOptions) -> Self {
        let certificate_service = CertificateService::new(
            store.clone(),
            Arc::new(options.fonts),
            options.background_path,
            options.settings,
        );

        Self {
            store,
            certificate_service,
            session_keys: SessionKeys::from_secret(options.jwt_secret.as_bytes()),
            render_gate: RenderGate::new(),
        }
    }
}
