//! Local HTTP API.
//!
//! Receives line-state notifications from the telephony side and exposes the
//! recorded sessions, recorder status and recording settings.

mod api_error;
mod handlers;
mod state;

pub(crate) use {api_error::ApiError, state::ServerState};

use crate::{AppError, AppResult};

use std::{net::SocketAddr, panic::Location};

use axum::{
    Router,
    routing::{get, post},
};
use error_location::ErrorLocation;
use tokio::{net::TcpListener, sync::watch};
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};

/// Build the API router.
pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/line/outgoing", post(handlers::outgoing_call))
        .route("/api/line/state", post(handlers::line_state))
        .route(
            "/api/recordings",
            get(handlers::list_recordings).delete(handlers::delete_all_recordings),
        )
        .route("/api/recordings/stats", get(handlers::recording_stats))
        .route(
            "/api/recordings/{id}",
            get(handlers::get_recording).delete(handlers::delete_recording),
        )
        .route("/api/status", get(handlers::status))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/api/settings/qualities", get(handlers::quality_presets))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind to `127.0.0.1:port` and serve until `shutdown_rx` turns true.
#[instrument(skip(state, shutdown_rx))]
pub(crate) async fn serve(
    state: ServerState,
    port: u16,
    mut shutdown_rx: watch::Receiver<bool>,
) -> AppResult<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("Failed to bind {}: {}", addr, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("HTTP server failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("HTTP API stopped");

    Ok(())
}
