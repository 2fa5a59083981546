use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::competition_rank;
use crate::models::{Participant, Ranked};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub current_stage: u32,
    pub standings: Vec<Ranked<Participant>>,
}

/// Current pool standings, best total first. Ties share a rank.
pub async fn get_standings(
    State(state): State<AppState>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let tracker = state.tracker.read().await;

    let standings = competition_rank(tracker.participants().to_vec(), |p| p.total_points);

    Ok(Json(StandingsResponse {
        current_stage: tracker.current_stage(),
        standings,
    }))
}
