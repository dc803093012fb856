//! HTTP surface.

pub mod auth;
pub mod handlers;
pub mod response;
pub mod state;

pub use auth::{AuthUser, SessionStore};
pub use state::AppState;

use crate::config::Config;
use crate::core::clock::SystemClock;
use crate::core::tracker::Tracker;
use crate::db::SqliteGateway;
use crate::errors::{AppError, AppResult};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/", get(handlers::dashboard))
        .route("/start", post(handlers::start))
        .route("/stop", post(handlers::stop))
        .route("/break_start", post(handlers::break_start))
        .route("/break_end", post(handlers::break_end))
        .route("/history", get(handlers::history))
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::post_settings),
        )
        .route("/export", get(handlers::export))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Production wiring: SQLite gateway, wall clock in the configured zone.
pub fn build_state(config: &Config) -> AppResult<AppState> {
    let tz = config.tz()?;
    let ttl = config.session_ttl()?;
    let gateway = SqliteGateway::open(&config.database, config.defaults, &config.legacy_user, tz)?;
    let tracker = Tracker::new(Arc::new(gateway), Arc::new(SystemClock::new(tz)));

    Ok(AppState::new(
        Arc::new(tracker),
        SessionStore::new(ttl),
    ))
}

/// Serve until Ctrl-C.
pub async fn serve(config: &Config) -> AppResult<()> {
    let state = build_state(config)?;
    let listener = TcpListener::bind(&config.listen).await?;

    info!(addr = %listener.local_addr()?, db = %config.database, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::from)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
