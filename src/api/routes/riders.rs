use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{RiderStatus, RiderSummary};

#[derive(Debug, Deserialize)]
pub struct ListRidersParams {
    /// Only riders drafted (true) or undrafted (false)
    pub in_team: Option<bool>,
    /// Professional team, exact match
    pub team: Option<String>,
    pub status: Option<RiderStatus>,
}

#[derive(Debug, Serialize)]
pub struct RiderListResponse {
    pub riders: Vec<RiderSummary>,
    pub total: usize,
}

/// All riders in the race with their points and selection counts.
pub async fn list_riders(
    State(state): State<AppState>,
    Query(params): Query<ListRidersParams>,
) -> Result<Json<RiderListResponse>, ApiError> {
    let tracker = state.tracker.read().await;

    let riders: Vec<RiderSummary> = tracker
        .all_riders()
        .iter()
        .filter(|r| params.in_team.map_or(true, |in_team| r.in_team == in_team))
        .filter(|r| params.team.as_deref().map_or(true, |team| r.team == team))
        .filter(|r| params.status.map_or(true, |status| r.status == status))
        .cloned()
        .collect();

    Ok(Json(RiderListResponse {
        total: riders.len(),
        riders,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, setup_test_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_riders_sorted_by_points() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/riders").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 3);
        assert_eq!(json["riders"][0]["name"], "Tadej Pogačar");
        assert_eq!(json["riders"][0]["totalPoints"], 30);
        assert_eq!(json["riders"][0]["selectedBy"], 1);
        assert_eq!(json["riders"][0]["inTeam"], true);
        assert_eq!(json["riders"][0]["points"].as_array().unwrap().len(), 22);
    }

    #[tokio::test]
    async fn test_list_riders_filter_by_team() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/riders?team=Visma").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        assert_eq!(json["riders"][0]["name"], "Jonas Vingegaard");
    }
}
