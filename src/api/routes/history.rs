use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{ParticipantProgression, RankingHistory};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub current_stage: u32,
    pub history: RankingHistory,
}

#[derive(Debug, Serialize)]
pub struct ProgressionResponse {
    pub progression: Vec<ParticipantProgression>,
}

/// Standings after every completed stage.
pub async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let tracker = state.tracker.read().await;
    Ok(Json(HistoryResponse {
        current_stage: tracker.current_stage(),
        history: tracker.ranking_history().clone(),
    }))
}

/// Rank timeline per participant.
pub async fn get_progression(
    State(state): State<AppState>,
) -> Result<Json<ProgressionResponse>, ApiError> {
    let tracker = state.tracker.read().await;
    Ok(Json(ProgressionResponse {
        progression: tracker.ranking_progression().to_vec(),
    }))
}
