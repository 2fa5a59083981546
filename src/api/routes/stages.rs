use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::ApplySummary;
use crate::models::{slot_for_stage, StageRankingEntry, StageResult};
use crate::storage::{commit_stages, StageRecord};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStageResponse {
    pub applied: ApplySummary,
    pub current_stage: u32,
    pub stage_winners: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PodiumResponse {
    pub stage: u32,
    pub podium: Vec<StageRankingEntry>,
}

/// Apply a stage result, then persist the snapshot and stage log.
///
/// The shared tracker is only replaced once both writes succeeded.
pub async fn submit_stage(
    State(state): State<AppState>,
    Json(result): Json<StageResult>,
) -> Result<Json<SubmitStageResponse>, ApiError> {
    let mut tracker = state.tracker.write().await;

    let mut next = tracker.clone();
    let applied = next.apply_stage(&result)?;

    let now = Utc::now();
    commit_stages(
        &state.storage,
        &[StageRecord::now(result)],
        &next.snapshot(now),
        &tracker.snapshot(now),
    )?;

    *tracker = next;
    info!(
        "Stage {} applied via API, {} points awarded",
        applied.stage, applied.points_awarded
    );

    Ok(Json(SubmitStageResponse {
        current_stage: tracker.current_stage(),
        stage_winners: tracker
            .stage_winners(applied.stage)
            .into_iter()
            .map(String::from)
            .collect(),
        applied,
    }))
}

/// Top three participants on a single stage.
pub async fn get_stage_podium(
    State(state): State<AppState>,
    Path(stage): Path<u32>,
) -> Result<Json<PodiumResponse>, ApiError> {
    if slot_for_stage(stage).is_none() {
        return Err(ApiError::BadRequest(format!(
            "Stage {} is out of range (1-22)",
            stage
        )));
    }

    let tracker = state.tracker.read().await;
    let podium = tracker
        .stage_podium(stage)
        .ok_or_else(|| ApiError::NotFound(format!("No results loaded for stage {}", stage)))?;

    Ok(Json(PodiumResponse { stage, podium }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, post_json, setup_test_state};
    use crate::storage::{read_snapshot, read_stage_log};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_submit_stage_applies_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let app = build_router(state.clone());

        let (status, json) = post_json(
            app,
            "/api/stages",
            r#"{
                "stage": 2,
                "top10": [{"position": 1, "rider": "jonas vingegaard"}],
                "jerseys": {"geel": {"rider": "Tadej Pogacar"}}
            }"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["currentStage"], 2);
        assert_eq!(json["applied"]["pointsAwarded"], 40);
        assert_eq!(json["stageWinners"][0], "Bram");

        let tracker = state.tracker.read().await;
        assert_eq!(tracker.state().participant("Anna").unwrap().total_points, 40);

        let log = read_stage_log(&state.storage).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].result.stage, 2);
        let snapshot = read_snapshot(&state.storage).unwrap().unwrap();
        assert_eq!(snapshot.current_stage, 2);
    }

    #[tokio::test]
    async fn test_submit_stage_with_unknown_rider_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        let app = build_router(state.clone());

        let (status, json) = post_json(
            app,
            "/api/stages",
            r#"{"stage": 2, "top10": [{"position": 1, "rider": "Nobody"}], "dropouts": ["Ghost"]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["issues"].as_array().unwrap().len(), 2);

        let tracker = state.tracker.read().await;
        assert_eq!(tracker.current_stage(), 1);
        assert!(read_stage_log(&state.storage).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_stage_snapshot_failure_leaves_log_and_tracker() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());
        // A file where the state directory should be makes the snapshot write fail
        std::fs::write(state.storage.state_dir(), b"").unwrap();
        let app = build_router(state.clone());

        let (status, json) = post_json(
            app,
            "/api/stages",
            r#"{"stage": 2, "top10": [{"position": 1, "rider": "Jonas Vingegaard"}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert!(read_stage_log(&state.storage).unwrap().is_empty());

        let tracker = state.tracker.read().await;
        assert_eq!(tracker.current_stage(), 1);
        assert_eq!(tracker.state().participant("Bram").unwrap().total_points, 0);
    }

    #[tokio::test]
    async fn test_stage_podium() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/stages/1/podium").await;

        assert_eq!(status, StatusCode::OK);
        let podium = json["podium"].as_array().unwrap();
        assert_eq!(podium.len(), 2);
        assert_eq!(podium[0]["name"], "Anna");
        assert_eq!(podium[1]["name"], "Cees");
    }

    #[tokio::test]
    async fn test_stage_podium_not_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) = get_json(app.clone(), "/api/stages/5/podium").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = get_json(app, "/api/stages/30/podium").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
