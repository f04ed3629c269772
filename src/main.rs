use std::net::SocketAddr;
use std::sync::Arc;

use exam_certificate_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    render::fonts::FontBook,
    routes,
    services::profile_service::PgProfileStore,
    AppState, StateOptions,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "exam_certificate_backend=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let fonts = FontBook::load_dir(&config.font_dir);
    if fonts.is_empty() {
        tracing::warn!(dir = %config.font_dir.display(), "No fonts loaded; certificate rendering will fail");
    }
    if !config.certificate_background.is_file() {
        tracing::warn!(
            path = %config.certificate_background.display(),
            "Certificate background not found"
        );
    }

    let state = AppState::new(
        Arc::new(PgProfileStore::new(pool)),
        StateOptions::from_config(config, fonts),
    );

    let app = routes::app(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
