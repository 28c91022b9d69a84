use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use emberleap_core::episode::Episode;

use crate::config::LimitsConfig;
use crate::episode_store::StoreError;
use crate::error::AppError;
use crate::state::AppState;

/// Longest accepted episode id or level label.
const MAX_LABEL_LEN: usize = 128;

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
    pub file: String,
}

#[derive(Debug, Serialize)]
pub struct EpisodeList {
    pub episodes: Vec<String>,
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidName(_) => AppError::BadRequest(e.to_string()),
            StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            StoreError::Io(_) | StoreError::Json(_) => {
                tracing::error!(error = %e, "Episode storage failed");
                AppError::Internal(e.to_string())
            },
        }
    }
}

/// Check an uploaded episode against the configured limits.
pub fn validate_episode(episode: &Episode, limits: &LimitsConfig) -> Result<(), AppError> {
    if episode.id.is_empty() || episode.id.len() > MAX_LABEL_LEN {
        return Err(AppError::BadRequest(format!(
            "id must be 1..={MAX_LABEL_LEN} chars"
        )));
    }
    if episode.levels.len() > limits.max_levels {
        return Err(AppError::BadRequest(format!(
            "Too many levels: {} (max {})",
            episode.levels.len(),
            limits.max_levels
        )));
    }
    for level in &episode.levels {
        if level.label.len() > MAX_LABEL_LEN {
            return Err(AppError::BadRequest(format!(
                "level label exceeds {MAX_LABEL_LEN} chars"
            )));
        }
    }
    let frames = episode.total_frames();
    if frames > limits.max_frames {
        return Err(AppError::BadRequest(format!(
            "Too many frames: {frames} (max {})",
            limits.max_frames
        )));
    }
    let events = episode.total_events();
    if events > limits.max_events {
        return Err(AppError::BadRequest(format!(
            "Too many events: {events} (max {})",
            limits.max_events
        )));
    }
    Ok(())
}

/// POST /save: store an uploaded episode.
pub async fn save_episode(
    State(state): State<AppState>,
    payload: Result<Json<Episode>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let Json(episode) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })?;

    validate_episode(&episode, &state.config.limits)?;

    let file = state.store.save(&episode).await?;
    Ok(Json(SaveResponse {
        status: "success",
        file,
    }))
}

/// GET /episodes: names of stored episodes, sorted.
pub async fn list_episodes(State(state): State<AppState>) -> Result<Json<EpisodeList>, AppError> {
    let episodes = state.store.list().await?;
    Ok(Json(EpisodeList { episodes }))
}

/// GET /episodes/{name}: one stored episode.
pub async fn get_episode(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Episode>, AppError> {
    Ok(Json(state.store.load(&name).await?))
}
