//! MDC Hackathon Server Library
//!
//! Public event pages, role-routed dashboards for participants and volunteers,
//! and an admin panel over a single SQLite database.

pub mod admin;
pub mod client;
pub mod core;
pub mod pages;
pub mod profiles;
pub mod routing;
pub mod session;
pub mod volunteer;

use axum::Router;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::core::db::Database;
use crate::core::{AppState, HackathonConfig};

/// Full application with the HTTP layers applied.
pub fn app(state: AppState) -> Router {
    crate::core::router(state.clone())
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    let config = HackathonConfig::default();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== Hackathon Server ===");

    config.ensure_dirs().await?;
    info!("Data directory: {:?}", config.data_dir);

    let db = Database::open(&config.database_url()).await?;
    info!("Database ready");

    let state = AppState::new(config.clone(), db);

    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            state.auth.ensure_admin(email, password).await?;
            info!("Admin account ready: {}", email);
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Set both HACKATHON_ADMIN_EMAIL and HACKATHON_ADMIN_PASSWORD to bootstrap an admin");
        }
        (None, None) => {}
    }

    let app = app(state);

    let addr = config.bind_addr();
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
