use crate::{
    AppCommand,
    server::{ApiError, ServerState},
};

use call_recorder_core::{
    CallDirection, FileStatus, LineNotification, LineState, RecorderStatus, RecordingQuality,
    RecordingSession, RecordingSettings,
};

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub(crate) struct OutgoingCallRequest {
    number: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LineStateRequest {
    state: String,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    direction: Option<CallDirection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordingsQuery {
    number: Option<String>,
}

/// Body of `PUT /api/settings`. Unlike stored settings, an unknown quality
/// name is rejected.
#[derive(Debug, Deserialize)]
pub(crate) struct SettingsUpdate {
    auto_record: bool,
    quality: RecordingQuality,
    show_notification: bool,
}

impl From<SettingsUpdate> for RecordingSettings {
    fn from(update: SettingsUpdate) -> Self {
        RecordingSettings {
            auto_record: update.auto_record,
            quality: update.quality,
            show_notification: update.show_notification,
        }
    }
}

/// A quality preset as offered on settings screens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QualityPreset {
    name: RecordingQuality,
    display_name: &'static str,
    sample_rate: u32,
    channels: u16,
    bit_rate: u32,
}

impl From<RecordingQuality> for QualityPreset {
    fn from(quality: RecordingQuality) -> Self {
        Self {
            name: quality,
            display_name: quality.display_name(),
            sample_rate: quality.sample_rate(),
            channels: quality.channels(),
            bit_rate: quality.bit_rate(),
        }
    }
}

/// A session plus whether its file is still on disk.
#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    #[serde(flatten)]
    session: RecordingSession,
    file_status: FileStatus,
}

impl From<RecordingSession> for SessionView {
    fn from(session: RecordingSession) -> Self {
        let file_status = session.file_status();
        Self {
            session,
            file_status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordingStats {
    count: usize,
    total_size_bytes: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletedResponse {
    deleted: usize,
}

#[instrument(skip(state))]
pub(crate) async fn outgoing_call(
    State(state): State<ServerState>,
    Json(request): Json<OutgoingCallRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .enqueue(AppCommand::Line(LineNotification::outgoing(&request.number)))
        .await?;
    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state))]
pub(crate) async fn line_state(
    State(state): State<ServerState>,
    Json(request): Json<LineStateRequest>,
) -> Result<StatusCode, ApiError> {
    let notification = LineNotification::LineStateChanged {
        state: LineState::from_raw(&request.state),
        number: request.number.filter(|n| !n.is_empty()),
        direction: request.direction,
    };
    state.enqueue(AppCommand::Line(notification)).await?;
    Ok(StatusCode::ACCEPTED)
}

pub(crate) async fn list_recordings(
    State(state): State<ServerState>,
    Query(query): Query<RecordingsQuery>,
) -> Json<Vec<SessionView>> {
    let sessions = match query.number.as_deref() {
        Some(number) => state.store.list_for(number),
        None => state.store.list(),
    };
    Json(sessions.into_iter().map(SessionView::from).collect())
}

pub(crate) async fn get_recording(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .store
        .get(id)
        .map(|session| Json(SessionView::from(session)))
        .ok_or_else(|| ApiError::not_found(format!("Recording {} not found", id)))
}

#[instrument(skip(state))]
pub(crate) async fn delete_recording(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.clone();
    let deleted = tokio::task::spawn_blocking(move || store.delete(id))
        .await
        .map_err(|e| ApiError::internal(format!("Delete task failed: {}", e)))??;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Recording {} not found", id)))
    }
}

#[instrument(skip(state))]
pub(crate) async fn delete_all_recordings(
    State(state): State<ServerState>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let store = state.store.clone();
    let deleted = tokio::task::spawn_blocking(move || store.delete_all())
        .await
        .map_err(|e| ApiError::internal(format!("Delete task failed: {}", e)))??;

    Ok(Json(DeletedResponse { deleted }))
}

pub(crate) async fn recording_stats(State(state): State<ServerState>) -> Json<RecordingStats> {
    Json(RecordingStats {
        count: state.store.count(),
        total_size_bytes: state.store.total_size_bytes(),
    })
}

pub(crate) async fn status(State(state): State<ServerState>) -> Json<RecorderStatus> {
    Json(state.status.borrow().clone())
}

pub(crate) async fn get_settings(State(state): State<ServerState>) -> Json<RecordingSettings> {
    Json(*state.settings.borrow())
}

pub(crate) async fn quality_presets() -> Json<Vec<QualityPreset>> {
    Json(
        RecordingQuality::ALL
            .into_iter()
            .map(QualityPreset::from)
            .collect(),
    )
}

#[instrument(skip(state))]
pub(crate) async fn update_settings(
    State(state): State<ServerState>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<RecordingSettings>, ApiError> {
    let Json(update) = payload
        .map_err(|e| ApiError::bad_request(format!("Invalid settings: {}", e.body_text())))?;
    let settings = RecordingSettings::from(update);

    {
        let mut config = state.config.lock().await;
        let mut updated = config.clone();
        updated.recording = settings;
        updated.save_to(&state.config_path)?;
        *config = updated;
    }

    state.settings.send_replace(settings);
    info!(
        auto_record = settings.auto_record,
        quality = %settings.quality,
        show_notification = settings.show_notification,
        "Recording settings updated"
    );

    Ok(Json(settings))
}
